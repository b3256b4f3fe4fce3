use tracing::{trace, warn};

use crate::basic::Encoding;
use crate::buffer::{BufferManager, DefaultBufferManager, TypedBuffer};
use crate::dictionary::DictionaryTable;
use crate::encoding::PageDecoder;
use crate::encoding::dictionary::DictionaryDecoder;
use crate::encoding::plain::PlainDecoder;
use crate::errors::{ColumnReaderError, Result, decode_err, schema_violation};
use crate::levels::LevelDecoder;
use crate::options::ColumnReaderOptions;
use crate::page::{DataPageV1, DataPageV2, DictionaryPage, Page, PageSource};
use crate::read_buffer::ReadCursor;
use crate::schema::ColumnDescPtr;
use crate::value_reader::ValueReader;
use crate::value_reader::bool::BoolValueReader;
use crate::value_reader::int96::Int96ValueReader;
use crate::value_reader::primitive::{
    PlainDoubleValueReader,
    PlainFloatValueReader,
    PlainInt32ValueReader,
    PlainInt64ValueReader,
};
use crate::value_reader::varlen::PlainByteArrayValueReader;

pub type BoolColumnChunkReader<P, B = DefaultBufferManager> =
    ColumnChunkReader<BoolValueReader, P, B>;
pub type Int32ColumnChunkReader<P, B = DefaultBufferManager> =
    ColumnChunkReader<PlainInt32ValueReader, P, B>;
pub type Int64ColumnChunkReader<P, B = DefaultBufferManager> =
    ColumnChunkReader<PlainInt64ValueReader, P, B>;
pub type Int96ColumnChunkReader<P, B = DefaultBufferManager> =
    ColumnChunkReader<Int96ValueReader, P, B>;
pub type FloatColumnChunkReader<P, B = DefaultBufferManager> =
    ColumnChunkReader<PlainFloatValueReader, P, B>;
pub type DoubleColumnChunkReader<P, B = DefaultBufferManager> =
    ColumnChunkReader<PlainDoubleValueReader, P, B>;
pub type ByteArrayColumnChunkReader<P, B = DefaultBufferManager> =
    ColumnChunkReader<PlainByteArrayValueReader, P, B>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// No page pulled yet.
    Start,
    /// Dictionary page consumed, no data page yet.
    DictionaryLoaded,
    /// A data page has been bound.
    Reading,
    /// Page source returned end of chunk.
    Exhausted,
    /// An error was recorded, see `ColumnChunkReader::err`.
    Failed,
}

/// Most definition levels decoded into scratch space at once.
const DEF_SCRATCH_BATCH_SIZE: usize = 1024;

/// Counts produced by a single `read_batch` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Number of level slots read, including nulls.
    pub levels_read: usize,
    /// Number of non-null values written to the value buffer.
    pub values_read: usize,
}

/// State for the currently bound data page.
#[derive(Debug)]
struct PageState<V: ValueReader> {
    /// Levels left in the page.
    remaining: usize,
    definitions: Option<LevelDecoder>,
    repetitions: Option<LevelDecoder>,
    decoder: PageDecoder<V>,
}

/// Reads levels and values for a single column chunk from a page source.
///
/// Pages are pulled lazily. A dictionary page, if present, must come before
/// any data page and is consumed transparently.
///
/// Errors are sticky. Once a call fails, the error is available through
/// `err`, `has_next` returns false, and reads and skips return zero counts
/// without touching the page source.
#[derive(Debug)]
pub struct ColumnChunkReader<V, P, B = DefaultBufferManager>
where
    V: ValueReader,
    P: PageSource,
    B: BufferManager,
{
    descr: ColumnDescPtr,
    source: P,
    manager: B,
    options: ColumnReaderOptions,
    state: ReaderState,
    page: Option<PageState<V>>,
    dictionary: Option<DictionaryTable<V::T>>,
    seen_data_page: bool,
    error: Option<ColumnReaderError>,
    /// Definition levels for calls that don't ask for them.
    def_scratch: TypedBuffer<i16>,
    /// Unpacked dictionary indices.
    index_scratch: TypedBuffer<u32>,
}

impl<V, P, B> ColumnChunkReader<V, P, B>
where
    V: ValueReader,
    P: PageSource,
    B: BufferManager,
{
    pub fn try_new(descr: impl Into<ColumnDescPtr>, source: P, manager: B) -> Result<Self> {
        Self::try_new_with_options(descr, source, manager, ColumnReaderOptions::default())
    }

    pub fn try_new_with_options(
        descr: impl Into<ColumnDescPtr>,
        source: P,
        manager: B,
        options: ColumnReaderOptions,
    ) -> Result<Self> {
        let descr = descr.into();
        if descr.physical_type != V::PHYSICAL_TYPE {
            return Err(schema_violation!(
                "column '{}' has physical type {}, reader expects {}",
                descr.path,
                descr.physical_type,
                V::PHYSICAL_TYPE
            ));
        }

        Ok(ColumnChunkReader {
            descr,
            source,
            manager,
            options,
            state: ReaderState::Start,
            page: None,
            dictionary: None,
            seen_data_page: false,
            error: None,
            def_scratch: TypedBuffer::empty(),
            index_scratch: TypedBuffer::empty(),
        })
    }

    pub fn descriptor(&self) -> &ColumnDescPtr {
        &self.descr
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// The error that stopped this reader, if any.
    pub fn err(&self) -> Option<&ColumnReaderError> {
        self.error.as_ref()
    }

    /// The chunk's dictionary, once its page has been consumed.
    pub fn dictionary(&self) -> Option<&DictionaryTable<V::T>> {
        self.dictionary.as_ref()
    }

    /// Returns whether there's at least one more level to read, pulling pages
    /// from the source as needed.
    ///
    /// Returns false at the end of the chunk or when an error occurred while
    /// pulling or binding a page.
    pub fn has_next(&mut self) -> bool {
        loop {
            if matches!(self.state, ReaderState::Exhausted | ReaderState::Failed) {
                return false;
            }
            if self.page.as_ref().is_some_and(|page| page.remaining > 0) {
                return true;
            }

            match self.advance_page() {
                Ok(true) => continue,
                Ok(false) => {
                    trace!(column = %self.descr.path, "column chunk exhausted");
                    self.page = None;
                    self.state = ReaderState::Exhausted;
                    return false;
                }
                Err(e) => {
                    self.fail(e);
                    return false;
                }
            }
        }
    }

    /// Read up to `batch_size` levels and the non-null values they define.
    ///
    /// `batch_size` is clamped to the length of any provided level buffer. For
    /// columns without definition levels every level has a value, so it's
    /// also clamped to `values.len()`.
    ///
    /// Definition levels are decoded even when `def_levels` is None since
    /// they determine the number of values. Repetition levels are skipped if
    /// not requested.
    ///
    /// If an error occurs after some levels were read, the partial result is
    /// returned and the error is available through `err`. If nothing was read,
    /// the error is returned directly.
    ///
    /// # Panics
    ///
    /// Panics if `values` is too small to hold the values defined by the
    /// levels read.
    pub fn read_batch(
        &mut self,
        batch_size: usize,
        values: &mut [V::T],
        mut def_levels: Option<&mut [i16]>,
        mut rep_levels: Option<&mut [i16]>,
    ) -> Result<BatchResult> {
        if self.error.is_some() {
            return Ok(BatchResult::default());
        }

        let mut batch_size = batch_size;
        if let Some(defs) = &def_levels {
            batch_size = batch_size.min(defs.len());
        }
        if let Some(reps) = &rep_levels {
            batch_size = batch_size.min(reps.len());
        }
        if !self.descr.has_definitions() {
            batch_size = batch_size.min(values.len());
        }

        let mut result = BatchResult::default();
        while result.levels_read < batch_size {
            if !self.has_next() {
                break;
            }
            let remaining = match &self.page {
                Some(page) => page.remaining,
                None => break,
            };

            let mut count = usize::min(batch_size - result.levels_read, remaining);
            if def_levels.is_none() && self.descr.has_definitions() {
                count = count.min(DEF_SCRATCH_BATCH_SIZE);
            }
            let levels = result.levels_read..result.levels_read + count;
            let defs_out = def_levels.as_deref_mut().map(|d| &mut d[levels.clone()]);
            let reps_out = rep_levels.as_deref_mut().map(|r| &mut r[levels]);

            let values_out = &mut values[result.values_read..];
            match self.read_from_page(count, values_out, defs_out, reps_out) {
                Ok(num_values) => {
                    result.levels_read += count;
                    result.values_read += num_values;
                }
                Err(e) => {
                    self.fail(e);
                    break;
                }
            }
        }

        if result.levels_read == 0 {
            // Any recorded error must have happened during this call.
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
        }

        Ok(result)
    }

    /// Skip up to `count` levels along with their values, returning the
    /// number of levels skipped.
    ///
    /// Values are skipped without being materialized where the encoding
    /// allows. Error handling is the same as `read_batch`.
    pub fn skip(&mut self, count: usize) -> Result<usize> {
        if self.error.is_some() {
            return Ok(0);
        }

        let mut skipped = 0;
        while skipped < count {
            if !self.has_next() {
                break;
            }
            let remaining = match &self.page {
                Some(page) => page.remaining,
                None => break,
            };

            let n = usize::min(count - skipped, remaining);
            match self.skip_in_page(n) {
                Ok(()) => skipped += n,
                Err(e) => {
                    self.fail(e);
                    break;
                }
            }
        }

        if skipped == 0 {
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
        }

        Ok(skipped)
    }

    /// Read `count` levels from the current page, returning the number of
    /// values read.
    fn read_from_page(
        &mut self,
        count: usize,
        values: &mut [V::T],
        def_levels: Option<&mut [i16]>,
        rep_levels: Option<&mut [i16]>,
    ) -> Result<usize> {
        let page = self
            .page
            .as_mut()
            .ok_or_else(|| decode_err!("no data page bound"))?;

        if let Some(reps) = page.repetitions.as_mut() {
            let n = match rep_levels {
                Some(out) => reps.decode(out)?,
                None => reps.skip(count)?,
            };
            check_levels_read("repetition", n, count)?;
        }

        let num_values = match page.definitions.as_mut() {
            Some(defs) => {
                let out = match def_levels {
                    Some(out) => out,
                    None => {
                        self.def_scratch.resize(&self.manager, count)?;
                        &mut self.def_scratch.as_slice_mut()[..count]
                    }
                };
                let n = defs.decode(out)?;
                check_levels_read("definition", n, count)?;
                let max_def = self.descr.max_def_level;
                out.iter().filter(|&&l| l == max_def).count()
            }
            None => count,
        };

        assert!(
            values.len() >= num_values,
            "value buffer holds {} values, but {num_values} values need to be read",
            values.len(),
        );

        page.decoder.read(
            self.dictionary.as_ref(),
            &mut values[..num_values],
            self.index_scratch.as_slice_mut(),
        )?;
        page.remaining -= count;

        Ok(num_values)
    }

    fn skip_in_page(&mut self, count: usize) -> Result<()> {
        let page = self
            .page
            .as_mut()
            .ok_or_else(|| decode_err!("no data page bound"))?;

        if let Some(reps) = page.repetitions.as_mut() {
            let n = reps.skip(count)?;
            check_levels_read("repetition", n, count)?;
        }

        let num_values = match page.definitions.as_mut() {
            Some(defs) => {
                let (n, num_values) = defs.skip_counting(count, self.descr.max_def_level)?;
                check_levels_read("definition", n, count)?;
                num_values
            }
            None => count,
        };

        page.decoder.skip(num_values)?;
        page.remaining -= count;

        Ok(())
    }

    /// Pull the next page from the source.
    ///
    /// Returns false if the source has no more pages.
    fn advance_page(&mut self) -> Result<bool> {
        let page = self
            .source
            .next_page()
            .map_err(ColumnReaderError::from_source)?;
        let page = match page {
            Some(page) => page,
            None => return Ok(false),
        };

        trace!(
            column = %self.descr.path,
            kind = page.kind(),
            encoding = %page.encoding(),
            num_values = page.num_values(),
            "pulled page"
        );

        match page {
            Page::Dictionary(page) => self.load_dictionary(&page)?,
            Page::DataV1(page) => self.bind_data_page_v1(page)?,
            Page::DataV2(page) => self.bind_data_page_v2(page)?,
        }

        Ok(true)
    }

    fn load_dictionary(&mut self, page: &DictionaryPage) -> Result<()> {
        if self.seen_data_page {
            return Err(schema_violation!(
                "dictionary page after data page in column '{}'",
                self.descr.path
            ));
        }
        if self.dictionary.is_some() {
            return Err(schema_violation!(
                "duplicate dictionary page in column '{}'",
                self.descr.path
            ));
        }

        self.dictionary = Some(DictionaryTable::try_new::<V>(&self.manager, page)?);
        self.state = ReaderState::DictionaryLoaded;

        Ok(())
    }

    fn bind_data_page_v1(&mut self, page: DataPageV1) -> Result<()> {
        let num_levels = usize::try_from(page.num_values)
            .map_err(|_| decode_err!("negative value count {}", page.num_values))?;
        let validate = self.options.validate_levels;
        let mut cursor = ReadCursor::new(page.buffer);

        // Repetition levels come first.
        let repetitions = if self.descr.has_repetitions() {
            check_level_encoding("repetition", page.rep_level_encoding)?;
            let section = LevelDecoder::split_v1_section(&mut cursor)?;
            Some(LevelDecoder::rle(section, self.descr.max_rep_level, validate))
        } else {
            None
        };

        let definitions = if self.descr.has_definitions() {
            check_level_encoding("definition", page.def_level_encoding)?;
            let section = LevelDecoder::split_v1_section(&mut cursor)?;
            Some(LevelDecoder::rle(section, self.descr.max_def_level, validate))
        } else {
            None
        };

        let decoder = self.create_decoder(page.encoding, cursor)?;
        self.bind(PageState {
            remaining: num_levels,
            definitions,
            repetitions,
            decoder,
        });

        Ok(())
    }

    fn bind_data_page_v2(&mut self, page: DataPageV2) -> Result<()> {
        let num_levels =
            page.num_levels(self.descr.has_definitions(), self.descr.has_repetitions())?;
        if page.num_nulls < 0 || page.num_nulls > page.num_values {
            return Err(decode_err!(
                "page has {} nulls but only {} values",
                page.num_nulls,
                page.num_values
            ));
        }

        let validate = self.options.validate_levels;
        let definitions = self
            .descr
            .has_definitions()
            .then(|| LevelDecoder::explicit(page.def_levels, self.descr.max_def_level, validate));
        let repetitions = self
            .descr
            .has_repetitions()
            .then(|| LevelDecoder::explicit(page.rep_levels, self.descr.max_rep_level, validate));

        let decoder = self.create_decoder(page.encoding, ReadCursor::new(page.values))?;
        self.bind(PageState {
            remaining: num_levels,
            definitions,
            repetitions,
            decoder,
        });

        Ok(())
    }

    fn create_decoder(&mut self, encoding: Encoding, cursor: ReadCursor) -> Result<PageDecoder<V>> {
        match encoding {
            Encoding::Plain => Ok(PageDecoder::Plain(PlainDecoder::new(cursor))),
            Encoding::PlainDictionary | Encoding::RleDictionary => {
                if self.dictionary.is_none() {
                    return Err(schema_violation!(
                        "data page with {encoding} encoding but no dictionary page in column '{}'",
                        self.descr.path
                    ));
                }
                if self.index_scratch.is_empty() {
                    let len = self.options.index_batch_size.max(1);
                    self.index_scratch.resize(&self.manager, len)?;
                }
                let decoder = DictionaryDecoder::try_new(cursor)?;
                trace!(
                    column = %self.descr.path,
                    bit_width = decoder.bit_width(),
                    "dictionary encoded page"
                );
                Ok(PageDecoder::Dictionary(decoder))
            }
            other => Err(schema_violation!(
                "unsupported data page encoding {other} in column '{}'",
                self.descr.path
            )),
        }
    }

    fn bind(&mut self, page: PageState<V>) {
        trace!(
            column = %self.descr.path,
            num_levels = page.remaining,
            dictionary = matches!(page.decoder, PageDecoder::Dictionary(_)),
            "bound data page"
        );
        self.page = Some(page);
        self.seen_data_page = true;
        self.state = ReaderState::Reading;
    }

    fn fail(&mut self, error: ColumnReaderError) {
        warn!(column = %self.descr.path, %error, "column chunk reader failed");
        self.page = None;
        self.error = Some(error);
        self.state = ReaderState::Failed;
    }
}

fn check_levels_read(kind: &str, read: usize, expected: usize) -> Result<()> {
    if read != expected {
        return Err(decode_err!(
            "{kind} levels ended after {read} of {expected} levels"
        ));
    }
    Ok(())
}

fn check_level_encoding(kind: &str, encoding: Encoding) -> Result<()> {
    if encoding != Encoding::Rle {
        return Err(schema_violation!(
            "unsupported {kind} level encoding {encoding}"
        ));
    }
    Ok(())
}
