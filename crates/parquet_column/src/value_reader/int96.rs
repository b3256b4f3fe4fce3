use super::ValueReader;
use crate::basic::PhysicalType;
use crate::errors::Result;
use crate::read_buffer::ReadCursor;

/// Julian day 2440588 corresponds to Unix epoch (1970-01-01)
const UNIX_EPOCH_JULIAN: i64 = 2_440_588;

const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;

/// Legacy 12 byte timestamp value.
///
/// - First 64 bits (8 bytes): nanoseconds since midnight
/// - Next 32 bits (4 bytes): Julian day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Int96 {
    pub nanos_of_day: i64,
    pub julian_day: u32,
}

impl Int96 {
    /// Interpret as nanoseconds since the Unix epoch.
    pub fn to_unix_nanos(&self) -> i64 {
        let days = self.julian_day as i64 - UNIX_EPOCH_JULIAN;
        days.wrapping_mul(NANOS_PER_DAY)
            .wrapping_add(self.nanos_of_day)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Int96ValueReader;

impl ValueReader for Int96ValueReader {
    type T = Int96;

    const PHYSICAL_TYPE: PhysicalType = PhysicalType::Int96;
    const MIN_PLAIN_BITS: usize = 96;

    fn read_plain(&mut self, data: &mut ReadCursor, out: &mut [Int96]) -> Result<()> {
        for dst in out {
            let low = data.read_u32_le()? as u64;
            let high = data.read_u32_le()? as u64;
            let julian_day = data.read_u32_le()?;
            *dst = Int96 {
                nanos_of_day: ((high << 32) | low) as i64,
                julian_day,
            };
        }
        Ok(())
    }

    fn skip_plain(&mut self, data: &mut ReadCursor, count: usize) -> Result<()> {
        data.skip_bytes(count.saturating_mul(12))
    }
}
