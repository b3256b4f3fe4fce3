//! Helpers for producing encoded pages in tests.

pub mod pages;

pub use pages::*;

use bytes::Bytes;

use crate::bitutil::num_required_bits;
use crate::value_reader::int96::Int96;
use crate::value_reader::varlen::ByteArray;

/// Most groups of 8 a single bit-packed run holds, matching what writers
/// emit with a one byte run header.
const MAX_PACKED_GROUPS: usize = 63;

/// Hybrid encodes `values`.
///
/// Runs of at least 8 equal values (or a run reaching the end of the input)
/// are RLE encoded. Everything in between is written as bit-packed runs of up
/// to 63 groups of 8. Only the last group of a run may contain padding.
pub fn encode_rle_bp<T>(values: &[T], bit_width: u8) -> Vec<u8>
where
    T: Copy + Into<i64>,
{
    let values: Vec<u64> = values.iter().map(|&v| Into::<i64>::into(v) as u64).collect();
    let repeats_at = |pos: usize| values[pos..].iter().take_while(|&&v| v == values[pos]).count();
    let rle_worthy = |pos: usize| {
        let run = repeats_at(pos);
        run >= 8 || pos + run == values.len()
    };

    let mut out = Vec::new();
    let mut pos = 0;
    while pos < values.len() {
        if rle_worthy(pos) {
            let run = repeats_at(pos);
            write_uleb128(&mut out, (run as u64) << 1);
            let num_bytes = (bit_width as usize).div_ceil(8);
            out.extend_from_slice(&values[pos].to_le_bytes()[..num_bytes]);
            pos += run;
            continue;
        }

        // Extend the packed run group by group until a repeat worth RLE
        // encoding starts.
        let start = pos;
        loop {
            pos = usize::min(pos + 8, values.len());
            let num_groups = (pos - start).div_ceil(8);
            if pos == values.len() || num_groups == MAX_PACKED_GROUPS || rle_worthy(pos) {
                break;
            }
        }

        let num_groups = (pos - start).div_ceil(8);
        let mut packed = vec![0u64; num_groups * 8];
        packed[..pos - start].copy_from_slice(&values[start..pos]);
        write_uleb128(&mut out, ((num_groups as u64) << 1) | 1);
        out.extend(bit_pack(&packed, bit_width));
    }

    out
}

/// Hybrid encodes levels for a v1 data page, including the 4 byte length
/// prefix.
pub fn encode_levels_v1(levels: &[i16], max_level: i16) -> Vec<u8> {
    let encoded = encode_rle_bp(levels, num_required_bits(max_level as u64));
    let mut out = (encoded.len() as i32).to_le_bytes().to_vec();
    out.extend(encoded);
    out
}

/// Encodes the value buffer of a dictionary encoded data page.
pub fn encode_dict_indices(indices: &[u32], dict_len: usize) -> Vec<u8> {
    let bit_width = num_required_bits(dict_len.saturating_sub(1) as u64);
    let mut out = vec![bit_width];
    out.extend(encode_rle_bp(indices, bit_width));
    out
}

/// Packs values LSB first using `bit_width` bits per value.
pub fn bit_pack(values: &[u64], bit_width: u8) -> Vec<u8> {
    let num_bits = values.len() * bit_width as usize;
    let mut out = vec![0u8; num_bits.div_ceil(8)];
    for (idx, &value) in values.iter().enumerate() {
        for bit in 0..bit_width as usize {
            if (value >> bit) & 1 == 1 {
                let pos = idx * bit_width as usize + bit;
                out[pos / 8] |= 1 << (pos % 8);
            }
        }
    }
    out
}

fn write_uleb128(out: &mut Vec<u8>, mut v: u64) {
    loop {
        let byte = (v & 0x7F) as u8;
        v >>= 7;
        if v == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Plain encoding of values.
pub trait PlainEncode: Sized {
    fn encode_plain(values: &[Self]) -> Vec<u8>;
}

macro_rules! impl_plain_encode_le {
    ($ty:ty) => {
        impl PlainEncode for $ty {
            fn encode_plain(values: &[Self]) -> Vec<u8> {
                values.iter().flat_map(|v| v.to_le_bytes()).collect()
            }
        }
    };
}

impl_plain_encode_le!(i32);
impl_plain_encode_le!(i64);
impl_plain_encode_le!(f32);
impl_plain_encode_le!(f64);

impl PlainEncode for bool {
    fn encode_plain(values: &[Self]) -> Vec<u8> {
        let bits: Vec<u64> = values.iter().map(|&b| b as u64).collect();
        bit_pack(&bits, 1)
    }
}

impl PlainEncode for Int96 {
    fn encode_plain(values: &[Self]) -> Vec<u8> {
        let mut out = Vec::with_capacity(values.len() * 12);
        for v in values {
            out.extend_from_slice(&v.nanos_of_day.to_le_bytes());
            out.extend_from_slice(&v.julian_day.to_le_bytes());
        }
        out
    }
}

impl PlainEncode for ByteArray {
    fn encode_plain(values: &[Self]) -> Vec<u8> {
        let mut out = Vec::new();
        for v in values {
            out.extend_from_slice(&(v.0.len() as u32).to_le_bytes());
            out.extend_from_slice(&v.0);
        }
        out
    }
}

impl ByteArray {
    pub fn from_vec(v: Vec<u8>) -> Self {
        ByteArray(Bytes::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rle_bp_layout() {
        // RLE run of 9, then one padded bit-packed group of [0, 1].
        let raw = encode_rle_bp(&[1i16, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1], 1);
        assert_eq!(vec![9 << 1, 1, 0b11, 0b10], raw);

        // Trailing run is always RLE.
        let raw = encode_rle_bp(&[3u32, 3], 2);
        assert_eq!(vec![2 << 1, 3], raw);
    }

    #[test]
    fn rle_bp_multi_group_runs() {
        // 20 alternating values and the first 4 repeats fill one run of 3
        // groups, the remaining 8 repeats are RLE.
        let mut values: Vec<u32> = (0..20).map(|i| i % 2).collect();
        values.extend([1; 12]);
        let raw = encode_rle_bp(&values, 1);
        assert_eq!(vec![(3 << 1) | 1, 0b1010_1010, 0b1010_1010, 0b1111_1010, 8 << 1, 1], raw);

        // Long mixed stretches are split at 63 groups.
        let values: Vec<u32> = (0..(64 * 8)).map(|i| i % 3).collect();
        let raw = encode_rle_bp(&values, 2);
        assert_eq!((63 << 1) | 1, raw[0]);
        assert_eq!((1 << 1) | 1, raw[1 + 63 * 2]);
        assert_eq!(1 + 63 * 2 + 1 + 2, raw.len());
    }

    #[test]
    fn levels_v1_prefix() {
        let raw = encode_levels_v1(&[1, 1, 1], 1);
        assert_eq!(vec![2, 0, 0, 0, 3 << 1, 1], raw);
    }
}
