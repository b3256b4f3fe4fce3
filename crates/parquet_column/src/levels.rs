use crate::bitutil::num_required_bits;
use crate::encoding::rle_bp::RleBpDecoder;
use crate::errors::{Result, decode_err};
use crate::read_buffer::ReadCursor;

/// Decodes definition or repetition levels for a single page.
#[derive(Debug)]
pub struct LevelDecoder {
    source: LevelSource,
    max_level: i16,
    /// Check every decoded level against `max_level`.
    validate: bool,
}

#[derive(Debug)]
enum LevelSource {
    /// Hybrid encoded levels (data page v1).
    Rle(RleBpDecoder),
    /// Levels already decoded by the page source (data page v2).
    Explicit { levels: Vec<i16>, pos: usize },
}

impl LevelDecoder {
    /// Create a decoder over hybrid encoded levels.
    pub fn rle(cursor: ReadCursor, max_level: i16, validate: bool) -> Self {
        let bit_width = num_required_bits(max_level as u64);
        LevelDecoder {
            source: LevelSource::Rle(RleBpDecoder::new(cursor, bit_width)),
            max_level,
            validate,
        }
    }

    /// Create a decoder over already decoded levels.
    pub fn explicit(levels: Vec<i16>, max_level: i16, validate: bool) -> Self {
        LevelDecoder {
            source: LevelSource::Explicit { levels, pos: 0 },
            max_level,
            validate,
        }
    }

    /// Splits a length-prefixed level section off the front of a v1 data page
    /// buffer.
    pub fn split_v1_section(page: &mut ReadCursor) -> Result<ReadCursor> {
        let len = page.read_i32_le()?;
        let len = usize::try_from(len)
            .map_err(|_| decode_err!("negative level section length {len}"))?;
        page.take_next(len)
    }

    /// Decode up to `out.len()` levels, returning the number decoded.
    pub fn decode(&mut self, out: &mut [i16]) -> Result<usize> {
        let n = match &mut self.source {
            LevelSource::Rle(dec) => dec.get_batch(out)?,
            LevelSource::Explicit { levels, pos } => {
                let n = usize::min(out.len(), levels.len() - *pos);
                out[..n].copy_from_slice(&levels[*pos..*pos + n]);
                *pos += n;
                n
            }
        };

        if self.validate {
            check_range(&out[..n], self.max_level)?;
        }

        Ok(n)
    }

    /// Skip up to `count` levels, returning the number skipped.
    ///
    /// With validation enabled skipped levels are checked like decoded ones,
    /// which means bit-packed runs have to be unpacked.
    pub fn skip(&mut self, count: usize) -> Result<usize> {
        if self.validate {
            return Ok(self.skip_counting(count, 0)?.0);
        }

        match &mut self.source {
            LevelSource::Rle(dec) => dec.skip(count),
            LevelSource::Explicit { levels, pos } => {
                let n = usize::min(count, levels.len() - *pos);
                *pos += n;
                Ok(n)
            }
        }
    }

    /// Skip up to `count` levels, counting the levels equal to `target`.
    ///
    /// Returns `(skipped, matched)`.
    pub fn skip_counting(&mut self, count: usize, target: i16) -> Result<(usize, usize)> {
        match &mut self.source {
            LevelSource::Rle(dec) => {
                let max = self.validate.then_some(self.max_level as u64);
                dec.skip_counting(count, target as u64, max)
            }
            LevelSource::Explicit { levels, pos } => {
                let n = usize::min(count, levels.len() - *pos);
                let skipped = &levels[*pos..*pos + n];
                if self.validate {
                    check_range(skipped, self.max_level)?;
                }
                let matched = skipped.iter().filter(|&&l| l == target).count();
                *pos += n;
                Ok((n, matched))
            }
        }
    }
}

fn check_range(levels: &[i16], max_level: i16) -> Result<()> {
    match levels.iter().find(|&&l| l < 0 || l > max_level) {
        Some(bad) => Err(decode_err!("level {bad} outside of range [0, {max_level}]")),
        None => Ok(()),
    }
}
