//! Entry views handed out by the processor.

use convoy_format::descriptor::Schema;
use convoy_format::index::EntryIndex;
use convoy_format::value::{CellValue, FromCell};
use convoy_sources::EntrySource;

use crate::error::{ProcessorError, ProcessorResult};

/// One entry of a chain, bound to the source it came from.
///
/// Field lookups run against the schema of that source, so a field that
/// is absent there fails at access time even when other sources in the
/// chain carry it.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    source: &'a dyn EntrySource,
    global: EntryIndex,
    local: EntryIndex,
}

impl<'a> Entry<'a> {
    pub(crate) fn new(source: &'a dyn EntrySource, global: EntryIndex, local: EntryIndex) -> Self {
        Self {
            source,
            global,
            local,
        }
    }

    /// Position within the whole chain.
    pub fn global_index(&self) -> EntryIndex {
        self.global
    }

    /// Position within the source this entry came from.
    pub fn local_index(&self) -> EntryIndex {
        self.local
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn schema(&self) -> &Schema {
        self.source.schema()
    }

    /// Reads `field` from this entry, converted to `T`.
    pub async fn value<T: FromCell>(&self, field: &str) -> ProcessorResult<T> {
        let cell = self.cell(field).await?;
        T::from_cell(&cell).ok_or_else(|| {
            ProcessorError::TypeMismatch(field.to_string(), T::type_name(), cell.kind_name())
        })
    }

    /// Reads `field` from this entry as a raw cell.
    pub async fn cell(&self, field: &str) -> ProcessorResult<CellValue> {
        if !self.source.schema().contains(field) {
            return Err(ProcessorError::FieldNotFound(field.to_string()));
        }
        Ok(self.source.read_cell(self.local, field).await?)
    }
}
