//! Explicit memory accounting for buffers owned by a column reader.
//!
//! Every buffer the reader allocates that scales with page or dictionary size
//! is created through a `BufferManager`. There is no global allocator state,
//! callers decide per reader whether usage is tracked or limited.

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::{ColumnReaderError, Result};

pub trait BufferManager: Debug + Clone + Send + Sync {
    /// Reserve `num_bytes` of memory.
    ///
    /// The bytes are released when the returned reservation is dropped.
    fn reserve(&self, num_bytes: usize) -> Result<Reservation>;
}

/// Buffer manager that doesn't track anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBufferManager;

impl BufferManager for DefaultBufferManager {
    fn reserve(&self, num_bytes: usize) -> Result<Reservation> {
        Ok(Reservation {
            size: num_bytes,
            tracker: None,
        })
    }
}

/// Buffer manager that counts reserved bytes, optionally failing reservations
/// past a limit.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct TrackedBufferManager {
    tracker: Arc<Tracker>,
}

#[derive(Debug, Default)]
struct Tracker {
    used: AtomicUsize,
    limit: Option<usize>,
}

impl TrackedBufferManager {
    pub fn with_limit(limit: usize) -> Self {
        TrackedBufferManager {
            tracker: Arc::new(Tracker {
                used: AtomicUsize::new(0),
                limit: Some(limit),
            }),
        }
    }

    /// Bytes currently held by live reservations.
    pub fn used_bytes(&self) -> usize {
        self.tracker.used.load(Ordering::Relaxed)
    }
}

impl BufferManager for TrackedBufferManager {
    fn reserve(&self, num_bytes: usize) -> Result<Reservation> {
        let tracker = &self.tracker;
        let mut used = tracker.used.load(Ordering::Relaxed);
        loop {
            let new_used = used.saturating_add(num_bytes);
            if let Some(limit) = tracker.limit {
                if new_used > limit {
                    return Err(ColumnReaderError::ResourceExhausted {
                        requested: num_bytes,
                        used,
                        limit,
                    });
                }
            }

            match tracker.used.compare_exchange_weak(
                used,
                new_used,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => used = actual,
            }
        }

        Ok(Reservation {
            size: num_bytes,
            tracker: Some(self.tracker.clone()),
        })
    }
}

/// Bytes reserved with a buffer manager.
#[derive(Debug)]
pub struct Reservation {
    size: usize,
    tracker: Option<Arc<Tracker>>,
}

impl Reservation {
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fold another reservation from the same manager into this one.
    fn merge(&mut self, mut other: Reservation) {
        if self.tracker.is_none() {
            self.tracker = other.tracker.take();
        }
        self.size += other.size;
        // Ownership of the bytes moved to self.
        other.size = 0;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if let Some(tracker) = &self.tracker {
            tracker.used.fetch_sub(self.size, Ordering::Relaxed);
        }
    }
}

/// Vector whose memory is accounted for by a buffer manager.
///
/// Only the inline size of `T` is accounted for.
#[derive(Debug)]
pub struct TypedBuffer<T> {
    data: Vec<T>,
    reservation: Reservation,
}

impl<T> TypedBuffer<T>
where
    T: Clone + Default,
{
    pub fn empty() -> Self {
        TypedBuffer {
            data: Vec::new(),
            reservation: Reservation {
                size: 0,
                tracker: None,
            },
        }
    }

    /// Create a buffer holding `len` default values.
    pub fn try_with_len(manager: &impl BufferManager, len: usize) -> Result<Self> {
        let reservation = manager.reserve(Self::byte_size(len))?;
        Ok(TypedBuffer {
            data: vec![T::default(); len],
            reservation,
        })
    }

    /// Resize the buffer, reserving more memory if it grows.
    ///
    /// Shrinking keeps the existing reservation so the buffer can be reused
    /// without going back to the manager.
    pub fn resize(&mut self, manager: &impl BufferManager, len: usize) -> Result<()> {
        let needed = Self::byte_size(len);
        if needed > self.reservation.size() {
            let additional = manager.reserve(needed - self.reservation.size())?;
            self.reservation.merge(additional);
        }
        self.data.resize(len, T::default());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn reserved_bytes(&self) -> usize {
        self.reservation.size()
    }

    fn byte_size(len: usize) -> usize {
        len.saturating_mul(std::mem::size_of::<T>())
    }
}
