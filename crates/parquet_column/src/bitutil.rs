use std::fmt::Debug;

use num_traits::Zero;

use crate::errors::{Result, decode_err};
use crate::read_buffer::ReadCursor;

/// Widest value a packed run may hold.
const MAX_BIT_WIDTH: u8 = 64;

/// Mask selecting the low `width` bits of a word.
const fn low_bits(width: u8) -> u64 {
    if width >= 64 { u64::MAX } else { (1 << width) - 1 }
}

/// Smallest bit width able to hold every value in `0..=max`.
pub const fn num_required_bits(max: u64) -> u8 {
    (u64::BITS - max.leading_zeros()) as u8
}

/// Position within a stream of LSB-first packed values.
///
/// Values don't align to bytes, so the offset into the current byte has to be
/// carried between calls. The cursor only advances past a byte once all of its
/// bits have been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitUnpackState {
    /// Bits of the cursor's first byte that were already consumed (0..8).
    pub bit_pos: u8,
    pub bit_width: u8,
}

impl BitUnpackState {
    pub const fn new(bit_width: u8) -> Self {
        BitUnpackState {
            bit_pos: 0,
            bit_width,
        }
    }

    /// Byte span and resulting bit offset after moving over `count` values.
    fn advance(&self, count: usize) -> (usize, u8) {
        let end = self.bit_pos as usize + count * self.bit_width as usize;
        (end / 8, (end % 8) as u8)
    }
}

/// Fills `out` with the next `out.len()` values of the packed stream.
pub fn bit_unpack<T>(
    state: &mut BitUnpackState,
    cursor: &mut ReadCursor,
    out: &mut [T],
) -> Result<()>
where
    T: BitPackEncodeable,
{
    let width = state.bit_width;
    if width > MAX_BIT_WIDTH {
        return Err(decode_err!("unsupported bit width {width}"));
    }
    if width == 0 {
        out.fill(T::zero());
        return Ok(());
    }

    let mask = low_bits(width);
    for dst in out.iter_mut() {
        // A value starting mid-byte spans at most 9 bytes.
        let span = (state.bit_pos as usize + width as usize).div_ceil(8);
        let bytes = cursor.as_slice();
        if bytes.len() < span {
            return Err(decode_err!(
                "bit-packed value needs {span} bytes, {} remaining",
                bytes.len()
            ));
        }

        let word = bytes[..span]
            .iter()
            .rev()
            .fold(0u128, |acc, &b| (acc << 8) | u128::from(b));
        *dst = T::from_u64((word >> state.bit_pos) as u64 & mask);

        let (consumed, bit_pos) = state.advance(1);
        cursor.skip_bytes(consumed)?;
        state.bit_pos = bit_pos;
    }

    Ok(())
}

/// Moves past `count` packed values without materializing them.
pub fn bit_skip(state: &mut BitUnpackState, cursor: &mut ReadCursor, count: usize) -> Result<()> {
    let (consumed, bit_pos) = state.advance(count);

    // A partially consumed trailing byte must still be present.
    let needed = consumed + usize::from(bit_pos != 0);
    if cursor.remaining() < needed {
        return Err(decode_err!(
            "bit-packed data truncated, need {needed} bytes, have {}",
            cursor.remaining()
        ));
    }

    cursor.skip_bytes(consumed)?;
    state.bit_pos = bit_pos;

    Ok(())
}

/// Decodes a ULEB128 integer, 7 payload bits per byte with the high bit
/// marking continuation.
pub fn read_unsigned_vlq(cursor: &mut ReadCursor) -> Result<u64> {
    let mut value = 0u64;
    for group in 0..10 {
        let byte = cursor.read_u8()?;
        let payload = u64::from(byte & 0x7F);
        if group == 9 && payload > 1 {
            break;
        }
        value |= payload << (7 * group);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(decode_err!("ULEB128 value overflows 64 bits"))
}

/// Integer targets for unpacked values. The packed bits are truncated to the
/// width of the target type.
pub trait BitPackEncodeable: Zero + Copy + Debug {
    fn from_u64(v: u64) -> Self;
}

macro_rules! impl_bit_pack_encodeable {
    ($($native:ty),*) => {
        $(
            impl BitPackEncodeable for $native {
                fn from_u64(v: u64) -> Self {
                    v as $native
                }
            }
        )*
    };
}

impl_bit_pack_encodeable!(u8, u16, u32, u64, i16, i32);
