use crate::errors::Result;
use crate::read_buffer::ReadCursor;
use crate::value_reader::ValueReader;

/// Sequential scan over plain encoded values.
#[derive(Debug)]
pub struct PlainDecoder<V: ValueReader> {
    cursor: ReadCursor,
    /// Per-page reader state.
    value_reader: V,
}

impl<V> PlainDecoder<V>
where
    V: ValueReader,
{
    pub fn new(cursor: ReadCursor) -> Self {
        PlainDecoder {
            cursor,
            value_reader: V::default(),
        }
    }

    pub fn read(&mut self, out: &mut [V::T]) -> Result<()> {
        self.value_reader.read_plain(&mut self.cursor, out)
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.value_reader.skip_plain(&mut self.cursor, count)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::testutil::PlainEncode;
    use crate::value_reader::primitive::PlainInt32ValueReader;

    #[test]
    fn skip_advances_by_width() {
        let values: Vec<i32> = (0..10).collect();
        let cursor = ReadCursor::new(Bytes::from(i32::encode_plain(&values)));
        let mut dec = PlainDecoder::<PlainInt32ValueReader>::new(cursor);

        dec.skip(3).unwrap();
        let mut out = [0; 4];
        dec.read(&mut out).unwrap();
        assert_eq!([3, 4, 5, 6], out);

        // Three values left.
        dec.skip(4).unwrap_err();
        dec.skip(2).unwrap();
        let mut last = [0; 1];
        dec.read(&mut last).unwrap();
        assert_eq!([9], last);
        dec.read(&mut last).unwrap_err();
    }
}
