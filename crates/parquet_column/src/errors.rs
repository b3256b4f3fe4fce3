use std::sync::Arc;

/// Error produced by a page source, propagated as-is through the reader.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ColumnReaderError {
    /// The page sequence or an encoding does not fit the column.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// Page bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("page source: {0}")]
    Source(#[source] Arc<dyn std::error::Error + Send + Sync>),

    #[error(
        "cannot reserve {requested} bytes, {used} of {limit} bytes already reserved"
    )]
    ResourceExhausted {
        requested: usize,
        used: usize,
        limit: usize,
    },
}

impl ColumnReaderError {
    pub fn from_source(err: SourceError) -> Self {
        ColumnReaderError::Source(Arc::from(err))
    }
}

pub type Result<T, E = ColumnReaderError> = std::result::Result<T, E>;

macro_rules! schema_violation {
    ($($arg:tt)*) => {
        crate::errors::ColumnReaderError::SchemaViolation(std::format!($($arg)*))
    };
}
pub(crate) use schema_violation;

macro_rules! decode_err {
    ($($arg:tt)*) => {
        crate::errors::ColumnReaderError::Decode(std::format!($($arg)*))
    };
}
pub(crate) use decode_err;
