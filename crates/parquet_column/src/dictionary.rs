use tracing::debug;

use crate::basic::Encoding;
use crate::buffer::{BufferManager, TypedBuffer};
use crate::errors::{Result, decode_err, schema_violation};
use crate::page::DictionaryPage;
use crate::read_buffer::ReadCursor;
use crate::value_reader::ValueReader;

/// Values of a column chunk's dictionary page, addressed by index.
///
/// Built once per chunk and never modified afterwards.
#[derive(Debug)]
pub struct DictionaryTable<T> {
    values: TypedBuffer<T>,
}

impl<T> DictionaryTable<T>
where
    T: Clone + Default,
{
    /// Decode the dictionary page using the plain value reader `V`.
    pub fn try_new<V>(manager: &impl BufferManager, page: &DictionaryPage) -> Result<Self>
    where
        V: ValueReader<T = T>,
    {
        if !matches!(page.encoding, Encoding::Plain | Encoding::PlainDictionary) {
            return Err(schema_violation!(
                "unsupported dictionary page encoding: {}",
                page.encoding
            ));
        }

        let num_values = usize::try_from(page.num_values).map_err(|_| {
            decode_err!("negative dictionary value count {}", page.num_values)
        })?;

        let available_bits = page.buffer.len().saturating_mul(8);
        if num_values.saturating_mul(V::MIN_PLAIN_BITS) > available_bits {
            return Err(decode_err!(
                "dictionary page declares {num_values} values but holds only {} bytes",
                page.buffer.len()
            ));
        }

        let mut values = TypedBuffer::try_with_len(manager, num_values)?;
        let mut cursor = ReadCursor::new(page.buffer.clone());
        V::default().read_plain(&mut cursor, values.as_slice_mut())?;

        debug!(
            num_values,
            physical_type = %V::PHYSICAL_TYPE,
            reserved_bytes = values.reserved_bytes(),
            "built dictionary table"
        );

        Ok(DictionaryTable { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.values.as_slice().get(idx)
    }

    pub fn values(&self) -> &[T] {
        self.values.as_slice()
    }
}
