use crate::bitutil::{BitPackEncodeable, BitUnpackState, bit_skip, bit_unpack, read_unsigned_vlq};
use crate::errors::{Result, decode_err};
use crate::read_buffer::ReadCursor;

/// Values unpacked at a time when a bit-packed run has to be inspected
/// without an output buffer.
const COUNT_CHUNK_SIZE: usize = 64;

/// Decoder for the RLE/bit-packing hybrid encoding.
///
/// The stream is a sequence of runs, each starting with a ULEB128 header:
///
/// - `header & 1 == 0`: RLE run of `header >> 1` copies of a single value
///   stored in `ceil(bit_width / 8)` little endian bytes.
/// - `header & 1 == 1`: bit-packed run of `(header >> 1) * 8` values, each
///   `bit_width` bits wide, packed LSB first.
///
/// Running out of runs is not an error here, callers know how many values to
/// expect and decide if a short read is fatal.
#[derive(Debug, Clone)]
pub struct RleBpDecoder {
    cursor: ReadCursor,
    bit_width: u8,
    /// Values left in the current RLE run.
    rle_left: usize,
    /// Value repeated by the current RLE run.
    rle_value: u64,
    /// Values left in the current bit-packed run.
    packed_left: usize,
    unpack_state: BitUnpackState,
}

impl RleBpDecoder {
    pub fn new(cursor: ReadCursor, bit_width: u8) -> Self {
        RleBpDecoder {
            cursor,
            bit_width,
            rle_left: 0,
            rle_value: 0,
            packed_left: 0,
            unpack_state: BitUnpackState::new(bit_width),
        }
    }

    pub fn bit_width(&self) -> u8 {
        self.bit_width
    }

    /// Decodes up to `out.len()` values, returning the number decoded.
    pub fn get_batch<T>(&mut self, out: &mut [T]) -> Result<usize>
    where
        T: BitPackEncodeable,
    {
        let mut read = 0;
        while read < out.len() {
            if self.rle_left > 0 {
                let n = usize::min(out.len() - read, self.rle_left);
                out[read..read + n].fill(T::from_u64(self.rle_value));
                self.rle_left -= n;
                read += n;
            } else if self.packed_left > 0 {
                let n = usize::min(out.len() - read, self.packed_left);
                bit_unpack(
                    &mut self.unpack_state,
                    &mut self.cursor,
                    &mut out[read..read + n],
                )?;
                self.packed_left -= n;
                read += n;
            } else if !self.next_run()? {
                break;
            }
        }

        Ok(read)
    }

    /// Decodes dictionary indices and writes the referenced dictionary values
    /// to `out`.
    ///
    /// `scratch` holds unpacked indices for bit-packed runs and must not be
    /// empty.
    pub fn get_batch_with_dict<T>(
        &mut self,
        dict: &[T],
        out: &mut [T],
        scratch: &mut [u32],
    ) -> Result<usize>
    where
        T: Clone,
    {
        debug_assert!(!scratch.is_empty());

        let mut read = 0;
        while read < out.len() {
            if self.rle_left > 0 {
                let n = usize::min(out.len() - read, self.rle_left);
                let value = dict_value(dict, self.rle_value)?;
                out[read..read + n].fill(value.clone());
                self.rle_left -= n;
                read += n;
            } else if self.packed_left > 0 {
                let n = usize::min(out.len() - read, self.packed_left).min(scratch.len());
                let indices = &mut scratch[..n];
                bit_unpack(&mut self.unpack_state, &mut self.cursor, indices)?;
                for (dst, &idx) in out[read..read + n].iter_mut().zip(indices.iter()) {
                    *dst = dict_value(dict, idx as u64)?.clone();
                }
                self.packed_left -= n;
                read += n;
            } else if !self.next_run()? {
                break;
            }
        }

        Ok(read)
    }

    /// Skips up to `count` values without unpacking them, returning the
    /// number skipped.
    pub fn skip(&mut self, count: usize) -> Result<usize> {
        let mut skipped = 0;
        while skipped < count {
            if self.rle_left > 0 {
                let n = usize::min(count - skipped, self.rle_left);
                self.rle_left -= n;
                skipped += n;
            } else if self.packed_left > 0 {
                let n = usize::min(count - skipped, self.packed_left);
                bit_skip(&mut self.unpack_state, &mut self.cursor, n)?;
                self.packed_left -= n;
                skipped += n;
            } else if !self.next_run()? {
                break;
            }
        }

        Ok(skipped)
    }

    /// Skips up to `count` values, counting how many of them equal `target`.
    ///
    /// RLE runs are counted without expanding them. Bit-packed values need to
    /// be inspected, but are never written anywhere. If `max` is given, any
    /// skipped value above it is a decode error.
    ///
    /// Returns `(skipped, matched)`.
    pub fn skip_counting(
        &mut self,
        count: usize,
        target: u64,
        max: Option<u64>,
    ) -> Result<(usize, usize)> {
        let mut chunk = [0u64; COUNT_CHUNK_SIZE];
        let mut skipped = 0;
        let mut matched = 0;

        while skipped < count {
            if self.rle_left > 0 {
                let n = usize::min(count - skipped, self.rle_left);
                check_max(self.rle_value, max)?;
                if self.rle_value == target {
                    matched += n;
                }
                self.rle_left -= n;
                skipped += n;
            } else if self.packed_left > 0 {
                let n = usize::min(count - skipped, self.packed_left).min(COUNT_CHUNK_SIZE);
                let values = &mut chunk[..n];
                bit_unpack(&mut self.unpack_state, &mut self.cursor, values)?;
                if let Some(&v) = values.iter().max() {
                    check_max(v, max)?;
                }
                matched += values.iter().filter(|&&v| v == target).count();
                self.packed_left -= n;
                skipped += n;
            } else if !self.next_run()? {
                break;
            }
        }

        Ok((skipped, matched))
    }

    /// Reads the next run header.
    ///
    /// Returns false if there are no more runs.
    fn next_run(&mut self) -> Result<bool> {
        loop {
            if self.cursor.is_empty() {
                return Ok(false);
            }

            let header = read_unsigned_vlq(&mut self.cursor)?;
            let count = usize::try_from(header >> 1)
                .map_err(|_| decode_err!("run length {} too large", header >> 1))?;

            if header & 1 == 1 {
                let declared = count
                    .checked_mul(8)
                    .ok_or_else(|| decode_err!("bit-packed group count {count} too large"))?;
                // Writers pad the last group, but some truncate the padding
                // bytes. Only values that are actually present can be decoded.
                let available = match self.bit_width {
                    0 => declared,
                    w => self.cursor.remaining().saturating_mul(8) / w as usize,
                };
                if declared > 0 && available == 0 {
                    return Err(decode_err!(
                        "bit-packed run of {declared} values has no data"
                    ));
                }
                self.packed_left = usize::min(declared, available);
                self.unpack_state = BitUnpackState::new(self.bit_width);
            } else {
                let num_bytes = (self.bit_width as usize).div_ceil(8);
                self.rle_value = self.cursor.read_uint_le(num_bytes)?;
                self.rle_left = count;
            }

            if self.rle_left > 0 || self.packed_left > 0 {
                return Ok(true);
            }
            // Zero length run, move on to the next header.
        }
    }
}

fn check_max(value: u64, max: Option<u64>) -> Result<()> {
    match max {
        Some(max) if value > max => Err(decode_err!("value {value} exceeds maximum {max}")),
        _ => Ok(()),
    }
}

fn dict_value<T>(dict: &[T], idx: u64) -> Result<&T> {
    usize::try_from(idx)
        .ok()
        .and_then(|idx| dict.get(idx))
        .ok_or_else(|| {
            decode_err!(
                "dictionary index {idx} out of bounds for dictionary of size {}",
                dict.len()
            )
        })
}
