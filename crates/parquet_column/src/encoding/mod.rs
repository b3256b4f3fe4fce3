pub mod dictionary;
pub mod plain;
pub mod rle_bp;

use dictionary::DictionaryDecoder;
use plain::PlainDecoder;

use crate::dictionary::DictionaryTable;
use crate::errors::{Result, schema_violation};
use crate::value_reader::ValueReader;

/// Value decoder bound to the current data page.
#[derive(Debug)]
pub enum PageDecoder<V: ValueReader> {
    Plain(PlainDecoder<V>),
    Dictionary(DictionaryDecoder),
}

impl<V> PageDecoder<V>
where
    V: ValueReader,
{
    /// Decode exactly `out.len()` non-null values.
    ///
    /// `index_scratch` is only used by dictionary decoding.
    pub fn read(
        &mut self,
        dict: Option<&DictionaryTable<V::T>>,
        out: &mut [V::T],
        index_scratch: &mut [u32],
    ) -> Result<()> {
        match self {
            PageDecoder::Plain(dec) => dec.read(out),
            PageDecoder::Dictionary(dec) => {
                let dict = dict.ok_or_else(|| {
                    schema_violation!("dictionary encoded page without a dictionary")
                })?;
                dec.read(dict.values(), out, index_scratch)
            }
        }
    }

    /// Skip exactly `count` non-null values.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        match self {
            PageDecoder::Plain(dec) => dec.skip(count),
            PageDecoder::Dictionary(dec) => dec.skip(count),
        }
    }
}
