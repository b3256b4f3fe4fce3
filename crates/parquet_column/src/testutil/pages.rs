use std::collections::VecDeque;

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{PlainEncode, encode_dict_indices, encode_levels_v1};
use crate::basic::Encoding;
use crate::errors::SourceError;
use crate::page::{DataPageV1, DataPageV2, DictionaryPage, Page, PageSource};
use crate::schema::ColumnDescriptor;
use crate::value_reader::int96::Int96;
use crate::value_reader::varlen::ByteArray;

/// Page source over pages held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPageSource {
    pages: VecDeque<Page>,
    /// Return an error instead of the page at this position.
    fail_at: Option<(usize, String)>,
    calls: usize,
}

impl InMemoryPageSource {
    pub fn new(pages: impl IntoIterator<Item = Page>) -> Self {
        InMemoryPageSource {
            pages: pages.into_iter().collect(),
            fail_at: None,
            calls: 0,
        }
    }

    /// Fail the call that would return page `idx` (zero based).
    pub fn with_error_at(mut self, idx: usize, msg: impl Into<String>) -> Self {
        self.fail_at = Some((idx, msg.into()));
        self
    }

    /// Number of times `next_page` was called.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl PageSource for InMemoryPageSource {
    fn next_page(&mut self) -> Result<Option<Page>, SourceError> {
        let idx = self.calls;
        self.calls += 1;
        if let Some((fail_idx, msg)) = &self.fail_at {
            if *fail_idx == idx {
                return Err(msg.clone().into());
            }
        }
        Ok(self.pages.pop_front())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVersion {
    V1,
    V2,
}

/// Build a data page from already encoded values.
///
/// Level arrays are only written if the column has the corresponding levels.
pub fn data_page(
    version: PageVersion,
    descr: &ColumnDescriptor,
    encoding: Encoding,
    values: Vec<u8>,
    num_levels: usize,
    def_levels: &[i16],
    rep_levels: &[i16],
) -> Page {
    match version {
        PageVersion::V1 => {
            let mut buf = Vec::new();
            if descr.has_repetitions() {
                buf.extend(encode_levels_v1(rep_levels, descr.max_rep_level));
            }
            if descr.has_definitions() {
                buf.extend(encode_levels_v1(def_levels, descr.max_def_level));
            }
            buf.extend(values);
            Page::DataV1(DataPageV1::new(buf, num_levels as i32, encoding))
        }
        PageVersion::V2 => {
            let def_levels = if descr.has_definitions() {
                def_levels.to_vec()
            } else {
                Vec::new()
            };
            let rep_levels = if descr.has_repetitions() {
                rep_levels.to_vec()
            } else {
                Vec::new()
            };
            let num_nulls = def_levels
                .iter()
                .filter(|&&l| l < descr.max_def_level)
                .count();
            let num_rows = if descr.has_repetitions() {
                rep_levels.iter().filter(|&&l| l == 0).count()
            } else {
                num_levels
            };
            Page::DataV2(DataPageV2 {
                values: Bytes::from(values),
                num_values: num_levels as i32,
                num_nulls: num_nulls as i32,
                num_rows: num_rows as i32,
                encoding,
                def_levels,
                rep_levels,
            })
        }
    }
}

/// Plain encoded dictionary page.
pub fn dictionary_page<T: PlainEncode>(values: &[T]) -> Page {
    Page::Dictionary(DictionaryPage::new(
        T::encode_plain(values),
        values.len() as i32,
        Encoding::Plain,
    ))
}

/// Random values for generated column chunks.
pub trait RandomValue: Sized {
    fn random_value(rng: &mut StdRng) -> Self;
}

impl RandomValue for bool {
    fn random_value(rng: &mut StdRng) -> Self {
        rng.random()
    }
}

impl RandomValue for i32 {
    fn random_value(rng: &mut StdRng) -> Self {
        rng.random()
    }
}

impl RandomValue for i64 {
    fn random_value(rng: &mut StdRng) -> Self {
        rng.random()
    }
}

impl RandomValue for f32 {
    fn random_value(rng: &mut StdRng) -> Self {
        rng.random()
    }
}

impl RandomValue for f64 {
    fn random_value(rng: &mut StdRng) -> Self {
        rng.random()
    }
}

impl RandomValue for Int96 {
    fn random_value(rng: &mut StdRng) -> Self {
        Int96 {
            nanos_of_day: rng.random_range(0..86_400_000_000_000),
            julian_day: rng.random_range(2_440_000..2_470_000),
        }
    }
}

impl RandomValue for ByteArray {
    fn random_value(rng: &mut StdRng) -> Self {
        let len = rng.random_range(0..16);
        ByteArray::from_vec((0..len).map(|_| rng.random()).collect())
    }
}

/// Column chunk generated by `make_pages`.
///
/// `values` only holds non-null values, in order.
#[derive(Debug)]
pub struct GeneratedChunk<T> {
    pub pages: Vec<Page>,
    pub num_levels: usize,
    pub values: Vec<T>,
    pub def_levels: Vec<i16>,
    pub rep_levels: Vec<i16>,
}

impl<T> GeneratedChunk<T> {
    pub fn source(&self) -> InMemoryPageSource {
        InMemoryPageSource::new(self.pages.clone())
    }
}

/// Generate `num_pages` pages with `levels_per_page` levels each.
///
/// Levels are random within the column's max levels. With a dictionary
/// encoding, a plain dictionary page of `levels_per_page` random values comes
/// first and data pages hold indices into it, with repeated indices common
/// enough to produce RLE runs.
pub fn make_pages<T>(
    seed: u64,
    version: PageVersion,
    descr: &ColumnDescriptor,
    num_pages: usize,
    levels_per_page: usize,
    encoding: Encoding,
) -> GeneratedChunk<T>
where
    T: PlainEncode + RandomValue + Clone,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut chunk = GeneratedChunk {
        pages: Vec::with_capacity(num_pages + 1),
        num_levels: num_pages * levels_per_page,
        values: Vec::new(),
        def_levels: Vec::new(),
        rep_levels: Vec::new(),
    };

    let dict: Vec<T> = if encoding.is_dictionary() {
        let dict: Vec<T> = (0..levels_per_page.max(1))
            .map(|_| T::random_value(&mut rng))
            .collect();
        chunk.pages.push(dictionary_page(&dict));
        dict
    } else {
        Vec::new()
    };

    for _ in 0..num_pages {
        let def_levels: Vec<i16> = if descr.has_definitions() {
            (0..levels_per_page)
                .map(|_| rng.random_range(0..=descr.max_def_level))
                .collect()
        } else {
            Vec::new()
        };
        let rep_levels: Vec<i16> = if descr.has_repetitions() {
            (0..levels_per_page)
                .map(|_| rng.random_range(0..=descr.max_rep_level))
                .collect()
        } else {
            Vec::new()
        };

        let num_values = if descr.has_definitions() {
            def_levels
                .iter()
                .filter(|&&l| l == descr.max_def_level)
                .count()
        } else {
            levels_per_page
        };

        let encoded = if encoding.is_dictionary() {
            let mut indices = Vec::with_capacity(num_values);
            let mut prev = 0;
            for _ in 0..num_values {
                let idx = if rng.random_bool(0.75) {
                    prev
                } else {
                    rng.random_range(0..dict.len() as u32)
                };
                indices.push(idx);
                chunk.values.push(dict[idx as usize].clone());
                prev = idx;
            }
            encode_dict_indices(&indices, dict.len())
        } else {
            let values: Vec<T> = (0..num_values).map(|_| T::random_value(&mut rng)).collect();
            let encoded = T::encode_plain(&values);
            chunk.values.extend(values);
            encoded
        };

        chunk.pages.push(data_page(
            version,
            descr,
            encoding,
            encoded,
            levels_per_page,
            &def_levels,
            &rep_levels,
        ));
        chunk.def_levels.extend(def_levels);
        chunk.rep_levels.extend(rep_levels);
    }

    chunk
}
