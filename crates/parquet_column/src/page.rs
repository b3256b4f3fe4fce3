//! Pages as handed to the column reader, already decompressed.

use bytes::Bytes;

use crate::basic::Encoding;
use crate::errors::{Result, SourceError, decode_err};

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Dictionary(DictionaryPage),
    DataV1(DataPageV1),
    DataV2(DataPageV2),
}

impl Page {
    pub fn num_values(&self) -> i32 {
        match self {
            Page::Dictionary(page) => page.num_values,
            Page::DataV1(page) => page.num_values,
            Page::DataV2(page) => page.num_values,
        }
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            Page::Dictionary(page) => page.encoding,
            Page::DataV1(page) => page.encoding,
            Page::DataV2(page) => page.encoding,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Page::Dictionary(_) => "dictionary",
            Page::DataV1(_) => "data_v1",
            Page::DataV2(_) => "data_v2",
        }
    }
}

/// Plain encoded dictionary values for the column chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryPage {
    pub buffer: Bytes,
    pub num_values: i32,
    pub encoding: Encoding,
}

impl DictionaryPage {
    pub fn new(buffer: impl Into<Bytes>, num_values: i32, encoding: Encoding) -> Self {
        DictionaryPage {
            buffer: buffer.into(),
            num_values,
            encoding,
        }
    }
}

/// Data page (v1).
///
/// Buffer layout: `[rep levels][def levels][values]`, where each level section
/// is prefixed with its byte length as a 4 byte little endian integer and is
/// only present if the column's corresponding max level is greater than 0.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPageV1 {
    pub buffer: Bytes,
    /// Number of levels in the page, including nulls.
    pub num_values: i32,
    pub encoding: Encoding,
    pub def_level_encoding: Encoding,
    pub rep_level_encoding: Encoding,
}

impl DataPageV1 {
    pub fn new(buffer: impl Into<Bytes>, num_values: i32, encoding: Encoding) -> Self {
        DataPageV1 {
            buffer: buffer.into(),
            num_values,
            encoding,
            def_level_encoding: Encoding::Rle,
            rep_level_encoding: Encoding::Rle,
        }
    }
}

/// Data page (v2).
///
/// Levels are stored outside of the value buffer and have already been
/// decoded by the page source.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPageV2 {
    pub values: Bytes,
    pub num_values: i32,
    pub num_nulls: i32,
    pub num_rows: i32,
    pub encoding: Encoding,
    pub def_levels: Vec<i16>,
    pub rep_levels: Vec<i16>,
}

impl DataPageV2 {
    /// Number of levels in the page.
    ///
    /// Explicit level arrays take precedence over the declared value count.
    pub fn num_levels(&self, has_defs: bool, has_reps: bool) -> Result<usize> {
        let declared = usize::try_from(self.num_values)
            .map_err(|_| decode_err!("negative value count {}", self.num_values))?;

        let num = match (has_defs, has_reps) {
            (true, true) => {
                if self.def_levels.len() != self.rep_levels.len() {
                    return Err(decode_err!(
                        "page has {} definition levels but {} repetition levels",
                        self.def_levels.len(),
                        self.rep_levels.len()
                    ));
                }
                self.def_levels.len()
            }
            (true, false) => self.def_levels.len(),
            (false, true) => self.rep_levels.len(),
            (false, false) => declared,
        };

        if num != declared {
            return Err(decode_err!(
                "page declares {declared} values but has {num} levels"
            ));
        }

        Ok(num)
    }
}

/// Supplies the pages of a single column chunk, in order.
pub trait PageSource {
    /// Returns the next page, or `None` at the end of the chunk.
    fn next_page(&mut self) -> Result<Option<Page>, SourceError>;
}

impl<S> PageSource for Box<S>
where
    S: PageSource + ?Sized,
{
    fn next_page(&mut self) -> Result<Option<Page>, SourceError> {
        (**self).next_page()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v2(num_values: i32, defs: usize, reps: usize) -> DataPageV2 {
        DataPageV2 {
            values: Bytes::new(),
            num_values,
            num_nulls: 0,
            num_rows: num_values,
            encoding: Encoding::Plain,
            def_levels: vec![0; defs],
            rep_levels: vec![0; reps],
        }
    }

    #[test]
    fn v2_num_levels() {
        assert_eq!(4, v2(4, 0, 0).num_levels(false, false).unwrap());
        assert_eq!(4, v2(4, 4, 0).num_levels(true, false).unwrap());
        assert_eq!(4, v2(4, 4, 4).num_levels(true, true).unwrap());

        v2(4, 3, 0).num_levels(true, false).unwrap_err();
        v2(4, 4, 3).num_levels(true, true).unwrap_err();
        v2(-1, 0, 0).num_levels(false, false).unwrap_err();
    }

    #[test]
    fn boxed_source() {
        struct Empty;
        impl PageSource for Empty {
            fn next_page(&mut self) -> Result<Option<Page>, SourceError> {
                Ok(None)
            }
        }

        let mut source: Box<dyn PageSource> = Box::new(Empty);
        assert!(source.next_page().unwrap().is_none());
    }
}
