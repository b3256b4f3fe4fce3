use super::rle_bp::RleBpDecoder;
use crate::errors::{Result, decode_err};
use crate::read_buffer::ReadCursor;

/// Max bit width for dictionary indices.
const MAX_INDEX_BIT_WIDTH: u8 = 32;

/// Decodes hybrid encoded dictionary indices, resolving them through the
/// chunk's dictionary.
///
/// The first byte of the page's value buffer holds the index bit width.
#[derive(Debug)]
pub struct DictionaryDecoder {
    indices: RleBpDecoder,
}

impl DictionaryDecoder {
    pub fn try_new(mut cursor: ReadCursor) -> Result<Self> {
        // Pages with zero values may omit the bit width entirely.
        let bit_width = if cursor.is_empty() {
            0
        } else {
            cursor.read_u8()?
        };

        if bit_width > MAX_INDEX_BIT_WIDTH {
            return Err(decode_err!(
                "dictionary index bit width {bit_width} exceeds {MAX_INDEX_BIT_WIDTH}"
            ));
        }

        Ok(DictionaryDecoder {
            indices: RleBpDecoder::new(cursor, bit_width),
        })
    }

    pub fn bit_width(&self) -> u8 {
        self.indices.bit_width()
    }

    /// Resolve `out.len()` indices through `dict`.
    pub fn read<T>(&mut self, dict: &[T], out: &mut [T], scratch: &mut [u32]) -> Result<()>
    where
        T: Clone,
    {
        let n = self.indices.get_batch_with_dict(dict, out, scratch)?;
        if n != out.len() {
            return Err(decode_err!(
                "dictionary index stream ended after {n} of {} values",
                out.len()
            ));
        }
        Ok(())
    }

    /// Skip `count` indices. Dictionary values are never touched.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        let n = self.indices.skip(count)?;
        if n != count {
            return Err(decode_err!(
                "dictionary index stream ended after skipping {n} of {count} values"
            ));
        }
        Ok(())
    }
}
