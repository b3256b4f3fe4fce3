use bytes::Bytes;

use super::ValueReader;
use crate::basic::PhysicalType;
use crate::errors::Result;
use crate::read_buffer::ReadCursor;

/// Variable length binary value.
///
/// Shares the page (or dictionary page) allocation it was decoded from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteArray(pub Bytes);

impl ByteArray {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&'static str> for ByteArray {
    fn from(s: &'static str) -> Self {
        ByteArray(Bytes::from_static(s.as_bytes()))
    }
}

/// Value reader for reading variable length strings and byte arrays.
///
/// Each value is prefixed by its length as a 4 byte little endian integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainByteArrayValueReader;

impl ValueReader for PlainByteArrayValueReader {
    type T = ByteArray;

    const PHYSICAL_TYPE: PhysicalType = PhysicalType::ByteArray;
    // Length prefix only.
    const MIN_PLAIN_BITS: usize = 32;

    fn read_plain(&mut self, data: &mut ReadCursor, out: &mut [ByteArray]) -> Result<()> {
        for dst in out {
            let len = data.read_u32_le()? as usize;
            *dst = ByteArray(data.read_bytes(len)?);
        }
        Ok(())
    }

    fn skip_plain(&mut self, data: &mut ReadCursor, count: usize) -> Result<()> {
        for _ in 0..count {
            let len = data.read_u32_le()? as usize;
            data.skip_bytes(len)?;
        }
        Ok(())
    }
}
