use super::ValueReader;
use crate::basic::PhysicalType;
use crate::bitutil::{BitUnpackState, bit_skip, bit_unpack};
use crate::errors::Result;
use crate::read_buffer::ReadCursor;

/// Bit-packed bool reader (LSB).
#[derive(Debug)]
pub struct BoolValueReader {
    state: BitUnpackState,
}

impl Default for BoolValueReader {
    fn default() -> Self {
        BoolValueReader {
            state: BitUnpackState::new(1),
        }
    }
}

impl ValueReader for BoolValueReader {
    type T = bool;

    const PHYSICAL_TYPE: PhysicalType = PhysicalType::Boolean;
    const MIN_PLAIN_BITS: usize = 1;

    fn read_plain(&mut self, data: &mut ReadCursor, out: &mut [bool]) -> Result<()> {
        let mut bits = [0u8; 64];
        for chunk in out.chunks_mut(bits.len()) {
            let bits = &mut bits[..chunk.len()];
            bit_unpack(&mut self.state, data, bits)?;
            for (dst, &bit) in chunk.iter_mut().zip(bits.iter()) {
                *dst = bit != 0;
            }
        }
        Ok(())
    }

    fn skip_plain(&mut self, data: &mut ReadCursor, count: usize) -> Result<()> {
        bit_skip(&mut self.state, data, count)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn read_across_bytes() {
        // [t, f, t, t, f, f, f, f] [f, t]
        let mut cursor = ReadCursor::new(Bytes::from_static(&[0b0000_1101, 0b0000_0010]));
        let mut reader = BoolValueReader::default();

        let mut out = [false; 3];
        reader.read_plain(&mut cursor, &mut out).unwrap();
        assert_eq!([true, false, true], out);

        reader.skip_plain(&mut cursor, 6).unwrap();

        let mut out = [false; 1];
        reader.read_plain(&mut cursor, &mut out).unwrap();
        assert_eq!([true], out);
    }
}
