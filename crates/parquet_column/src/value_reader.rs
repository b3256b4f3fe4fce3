pub mod bool;
pub mod int96;
pub mod primitive;
pub mod varlen;

use std::fmt::Debug;

use crate::basic::PhysicalType;
use crate::errors::Result;
use crate::read_buffer::ReadCursor;

/// Reads plain encoded values of one physical type from a page buffer.
///
/// A new value reader is created every time a new page is loaded (via
/// `Default`), so any state (e.g. bit position when reading booleans) only
/// lives for a single page.
///
/// Dictionary pages are plain encoded as well, so the same reader is used to
/// build the dictionary table.
pub trait ValueReader: Default + Debug + Send {
    /// Value produced for each non-null slot.
    type T: Clone + Default + Debug + Send + Sync;

    /// Physical type of the columns this reader can decode.
    const PHYSICAL_TYPE: PhysicalType;

    /// Fewest bits a single plain encoded value can occupy.
    const MIN_PLAIN_BITS: usize;

    /// Read `out.len()` values from the buffer.
    fn read_plain(&mut self, data: &mut ReadCursor, out: &mut [Self::T]) -> Result<()>;

    /// Advance past `count` values without producing them.
    fn skip_plain(&mut self, data: &mut ReadCursor, count: usize) -> Result<()>;
}
