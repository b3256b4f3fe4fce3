use bytes::{Buf, Bytes};

use crate::errors::{Result, decode_err};

/// Forward-only cursor over a page buffer.
///
/// All reads are bounds checked, a truncated page results in a decode error
/// rather than a panic. Slicing the cursor never copies, the returned `Bytes`
/// share the page allocation.
#[derive(Debug, Clone, Default)]
pub struct ReadCursor {
    buf: Bytes,
}

impl ReadCursor {
    pub fn new(buf: Bytes) -> Self {
        ReadCursor { buf }
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the unread bytes without advancing.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32_le())
    }

    /// Reads `n` bytes as a little endian unsigned integer.
    ///
    /// Used for RLE run values which take the minimum number of bytes needed to
    /// hold the bit width.
    pub fn read_uint_le(&mut self, n: usize) -> Result<u64> {
        if n > 8 {
            return Err(decode_err!("cannot read {n} byte integer"));
        }
        if n == 0 {
            return Ok(0);
        }
        self.ensure(n)?;
        Ok(self.buf.get_uint_le(n))
    }

    /// Splits off the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        self.ensure(n)?;
        Ok(self.buf.split_to(n))
    }

    /// Splits off the next `n` bytes as their own cursor.
    pub fn take_next(&mut self, n: usize) -> Result<ReadCursor> {
        Ok(ReadCursor::new(self.read_bytes(n)?))
    }

    pub fn skip_bytes(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.buf.advance(n);
        Ok(())
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.buf.len() < n {
            return Err(decode_err!(
                "unexpected end of buffer, need {n} bytes, have {}",
                self.buf.len()
            ));
        }
        Ok(())
    }
}
