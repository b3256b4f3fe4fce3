//! Reader dispatch on a column's physical type.

use crate::basic::PhysicalType;
use crate::buffer::{BufferManager, DefaultBufferManager};
use crate::column_reader::{
    BoolColumnChunkReader,
    ByteArrayColumnChunkReader,
    ColumnChunkReader,
    DoubleColumnChunkReader,
    FloatColumnChunkReader,
    Int32ColumnChunkReader,
    Int64ColumnChunkReader,
    Int96ColumnChunkReader,
    ReaderState,
};
use crate::errors::{ColumnReaderError, Result, schema_violation};
use crate::options::ColumnReaderOptions;
use crate::page::PageSource;
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

/// Column chunk reader for any supported physical type.
#[derive(Debug)]
pub enum TypedColumnChunkReader<P, B = DefaultBufferManager>
where
    P: PageSource,
    B: BufferManager,
{
    Bool(BoolColumnChunkReader<P, B>),
    Int32(Int32ColumnChunkReader<P, B>),
    Int64(Int64ColumnChunkReader<P, B>),
    Int96(Int96ColumnChunkReader<P, B>),
    Float(FloatColumnChunkReader<P, B>),
    Double(DoubleColumnChunkReader<P, B>),
    ByteArray(ByteArrayColumnChunkReader<P, B>),
}

macro_rules! dispatch {
    ($self:expr, $reader:ident => $body:expr) => {
        match $self {
            TypedColumnChunkReader::Bool($reader) => $body,
            TypedColumnChunkReader::Int32($reader) => $body,
            TypedColumnChunkReader::Int64($reader) => $body,
            TypedColumnChunkReader::Int96($reader) => $body,
            TypedColumnChunkReader::Float($reader) => $body,
            TypedColumnChunkReader::Double($reader) => $body,
            TypedColumnChunkReader::ByteArray($reader) => $body,
        }
    };
}

impl<P, B> TypedColumnChunkReader<P, B>
where
    P: PageSource,
    B: BufferManager,
{
    /// Create a reader matching the descriptor's physical type.
    pub fn try_new(
        descr: impl Into<ColumnDescPtr>,
        source: P,
        manager: B,
        options: ColumnReaderOptions,
    ) -> Result<Self> {
        let descr = descr.into();
        Ok(match descr.physical_type {
            PhysicalType::Boolean => Self::Bool(ColumnChunkReader::try_new_with_options(
                descr, source, manager, options,
            )?),
            PhysicalType::Int32 => Self::Int32(ColumnChunkReader::try_new_with_options(
                descr, source, manager, options,
            )?),
            PhysicalType::Int64 => Self::Int64(ColumnChunkReader::try_new_with_options(
                descr, source, manager, options,
            )?),
            PhysicalType::Int96 => Self::Int96(ColumnChunkReader::try_new_with_options(
                descr, source, manager, options,
            )?),
            PhysicalType::Float => Self::Float(ColumnChunkReader::try_new_with_options(
                descr, source, manager, options,
            )?),
            PhysicalType::Double => Self::Double(ColumnChunkReader::try_new_with_options(
                descr, source, manager, options,
            )?),
            PhysicalType::ByteArray => Self::ByteArray(ColumnChunkReader::try_new_with_options(
                descr, source, manager, options,
            )?),
            other @ PhysicalType::FixedLenByteArray => {
                return Err(schema_violation!(
                    "physical type {other} not supported for column '{}'",
                    descr.path
                ));
            }
        })
    }

    pub fn physical_type(&self) -> PhysicalType {
        dispatch!(self, reader => reader.descriptor().physical_type)
    }

    pub fn has_next(&mut self) -> bool {
        dispatch!(self, reader => reader.has_next())
    }

    pub fn skip(&mut self, count: usize) -> Result<usize> {
        dispatch!(self, reader => reader.skip(count))
    }

    pub fn err(&self) -> Option<&ColumnReaderError> {
        dispatch!(self, reader => reader.err())
    }

    pub fn state(&self) -> ReaderState {
        dispatch!(self, reader => reader.state())
    }
}

/// Converts a typed reader into the concrete reader for a value reader.
pub trait TypedReaderExt: ValueReader + Sized {
    /// Errors if the reader is for a different physical type.
    fn from_typed<P, B>(
        reader: TypedColumnChunkReader<P, B>,
    ) -> Result<ColumnChunkReader<Self, P, B>>
    where
        P: PageSource,
        B: BufferManager;
}

macro_rules! impl_from_typed {
    ($value_reader:ty, $variant:ident) => {
        impl TypedReaderExt for $value_reader {
            fn from_typed<P, B>(
                reader: TypedColumnChunkReader<P, B>,
            ) -> Result<ColumnChunkReader<Self, P, B>>
            where
                P: PageSource,
                B: BufferManager,
            {
                match reader {
                    TypedColumnChunkReader::$variant(r) => Ok(r),
                    other => Err(schema_violation!(
                        "cannot read {} column with a {} reader",
                        other.physical_type(),
                        <Self as ValueReader>::PHYSICAL_TYPE
                    )),
                }
            }
        }
    };
}

impl_from_typed!(BoolValueReader, Bool);
impl_from_typed!(PlainInt32ValueReader, Int32);
impl_from_typed!(PlainInt64ValueReader, Int64);
impl_from_typed!(Int96ValueReader, Int96);
impl_from_typed!(PlainFloatValueReader, Float);
impl_from_typed!(PlainDoubleValueReader, Double);
impl_from_typed!(PlainByteArrayValueReader, ByteArray);

/// Unwraps `reader` into the concrete reader for `V`.
pub fn get_typed_column_reader<V, P, B>(
    reader: TypedColumnChunkReader<P, B>,
) -> Result<ColumnChunkReader<V, P, B>>
where
    V: TypedReaderExt,
    P: PageSource,
    B: BufferManager,
{
    V::from_typed(reader)
}
