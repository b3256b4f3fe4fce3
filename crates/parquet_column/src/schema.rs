use std::sync::Arc;

use crate::basic::PhysicalType;
use crate::errors::{Result, schema_violation};

/// Describes the leaf column a chunk reader decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Dotted path from the schema root to the leaf.
    pub path: String,
    pub physical_type: PhysicalType,
    /// Max definition level, 0 for required columns with required ancestors.
    pub max_def_level: i16,
    /// Max repetition level, 0 if there are no repeated ancestors.
    pub max_rep_level: i16,
}

pub type ColumnDescPtr = Arc<ColumnDescriptor>;

impl ColumnDescriptor {
    pub fn try_new(
        path: impl Into<String>,
        physical_type: PhysicalType,
        max_def_level: i16,
        max_rep_level: i16,
    ) -> Result<Self> {
        let path = path.into();
        if max_def_level < 0 || max_rep_level < 0 {
            return Err(schema_violation!(
                "negative max level for column '{path}' (def: {max_def_level}, \
                 rep: {max_rep_level})"
            ));
        }
        if max_rep_level > max_def_level {
            // Every repeated field contributes to both levels.
            return Err(schema_violation!(
                "max repetition level {max_rep_level} exceeds max definition level \
                 {max_def_level} for column '{path}'"
            ));
        }

        Ok(ColumnDescriptor {
            path,
            physical_type,
            max_def_level,
            max_rep_level,
        })
    }

    /// Descriptor for a top-level required column.
    pub fn required(path: impl Into<String>, physical_type: PhysicalType) -> Self {
        ColumnDescriptor {
            path: path.into(),
            physical_type,
            max_def_level: 0,
            max_rep_level: 0,
        }
    }

    pub fn has_definitions(&self) -> bool {
        self.max_def_level > 0
    }

    pub fn has_repetitions(&self) -> bool {
        self.max_rep_level > 0
    }
}
