/// Default number of dictionary indices unpacked at a time.
pub const DEFAULT_INDEX_BATCH_SIZE: usize = 1024;

/// Options for a column chunk reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnReaderOptions {
    /// Error on definition or repetition levels greater than the column's max
    /// level.
    pub validate_levels: bool,
    /// Number of dictionary indices unpacked at a time when resolving bit-packed
    /// runs.
    pub index_batch_size: usize,
}

impl Default for ColumnReaderOptions {
    fn default() -> Self {
        ColumnReaderOptions {
            validate_levels: true,
            index_batch_size: DEFAULT_INDEX_BATCH_SIZE,
        }
    }
}

impl ColumnReaderOptions {
    pub fn with_validate_levels(mut self, validate: bool) -> Self {
        self.validate_levels = validate;
        self
    }

    /// Sets the index batch size, a size of 0 is treated as 1.
    pub fn with_index_batch_size(mut self, size: usize) -> Self {
        self.index_batch_size = size.max(1);
        self
    }
}
