//! Decoding of parquet column chunks.
//!
//! A `ColumnChunkReader` pulls already decompressed pages from a `PageSource`
//! and produces definition levels, repetition levels, and the non-null values
//! of a single leaf column.
//!
//! # Vocabulary
//!
//! - **Level**: One slot in the column. Every level has a definition level,
//!   and a repetition level if the column is nested in a repeated field.
//! - **Value**: A non-null level, one whose definition level equals the
//!   column's max definition level. Values are written densely.
//! - **Dictionary page**: Plain encoded values that dictionary encoded data
//!   pages index into. At most one per chunk, before any data page.
pub mod basic;
pub mod bitutil;
pub mod buffer;
pub mod column_reader;
pub mod dictionary;
pub mod encoding;
pub mod errors;
pub mod levels;
pub mod options;
pub mod page;
pub mod read_buffer;
pub mod schema;
pub mod typed;
pub mod value_reader;

#[cfg(test)]
pub mod testutil;

pub use basic::{Encoding, PhysicalType};
pub use buffer::{BufferManager, DefaultBufferManager, TrackedBufferManager};
pub use column_reader::{BatchResult, ColumnChunkReader, ReaderState};
pub use errors::{ColumnReaderError, Result};
pub use options::ColumnReaderOptions;
pub use page::{DataPageV1, DataPageV2, DictionaryPage, Page, PageSource};
pub use schema::{ColumnDescPtr, ColumnDescriptor};
pub use typed::{TypedColumnChunkReader, TypedReaderExt};
