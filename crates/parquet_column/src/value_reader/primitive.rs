use std::fmt::Debug;
use std::marker::PhantomData;

use super::ValueReader;
use crate::basic::PhysicalType;
use crate::errors::{Result, decode_err};
use crate::read_buffer::ReadCursor;

pub type PlainInt32ValueReader = PlainPrimitiveValueReader<i32>;
pub type PlainInt64ValueReader = PlainPrimitiveValueReader<i64>;
pub type PlainFloatValueReader = PlainPrimitiveValueReader<f32>;
pub type PlainDoubleValueReader = PlainPrimitiveValueReader<f64>;

/// A value stored as a fixed number of little endian bytes.
pub trait FixedWidthValue: Copy + Default + Debug + Send + Sync + 'static {
    const PHYSICAL_TYPE: PhysicalType;
    /// Encoded size in bytes.
    const WIDTH: usize;

    /// Decode from exactly `WIDTH` bytes.
    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_fixed_width {
    ($native:ty, $physical:expr) => {
        impl FixedWidthValue for $native {
            const PHYSICAL_TYPE: PhysicalType = $physical;
            const WIDTH: usize = std::mem::size_of::<$native>();

            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$native>()];
                buf.copy_from_slice(bytes);
                <$native>::from_le_bytes(buf)
            }
        }
    };
}

impl_fixed_width!(i32, PhysicalType::Int32);
impl_fixed_width!(i64, PhysicalType::Int64);
impl_fixed_width!(f32, PhysicalType::Float);
impl_fixed_width!(f64, PhysicalType::Double);

/// Value reader for fixed width values, decoded with no conversion.
///
/// Skipping only moves the cursor by `count * WIDTH` bytes.
#[derive(Debug, Clone, Copy)]
pub struct PlainPrimitiveValueReader<T> {
    _t: PhantomData<fn() -> T>,
}

impl<T> Default for PlainPrimitiveValueReader<T> {
    fn default() -> Self {
        PlainPrimitiveValueReader { _t: PhantomData }
    }
}

impl<T> ValueReader for PlainPrimitiveValueReader<T>
where
    T: FixedWidthValue,
{
    type T = T;

    const PHYSICAL_TYPE: PhysicalType = T::PHYSICAL_TYPE;
    const MIN_PLAIN_BITS: usize = T::WIDTH * 8;

    fn read_plain(&mut self, data: &mut ReadCursor, out: &mut [T]) -> Result<()> {
        let bytes = data.read_bytes(byte_len::<T>(out.len())?)?;
        for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(T::WIDTH)) {
            *dst = T::from_le_slice(chunk);
        }
        Ok(())
    }

    fn skip_plain(&mut self, data: &mut ReadCursor, count: usize) -> Result<()> {
        data.skip_bytes(byte_len::<T>(count)?)
    }
}

fn byte_len<T: FixedWidthValue>(count: usize) -> Result<usize> {
    count
        .checked_mul(T::WIDTH)
        .ok_or_else(|| decode_err!("{count} values of width {} overflow", T::WIDTH))
}
