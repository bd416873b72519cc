//! Container-backed sources.

use std::sync::Arc;

use convoy_format::container::ContainerReader;
use convoy_format::descriptor::Schema;
use convoy_format::index::EntryIndex;
use convoy_format::value::CellValue;
use object_store::ObjectStore;

use crate::error::{SourceError, SourceResult};
use crate::spec::SourceSpec;
use crate::{EntrySource, SourceOpener};

/// Opens container directories from one object store.
#[derive(Debug, Clone)]
pub struct ContainerFormat {
    store: Arc<dyn ObjectStore>,
}

impl ContainerFormat {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl SourceOpener for ContainerFormat {
    async fn open(&self, spec: &SourceSpec) -> SourceResult<Box<dyn EntrySource>> {
        tracing::debug!(source = %spec, "opening container source");
        let reader = ContainerReader::open(self.store.clone(), spec.location().clone())
            .await
            .map_err(|source| {
                SourceError::Open(spec.name().to_string(), spec.location().to_string(), source)
            })?;
        if reader.name() != spec.name() {
            return Err(SourceError::NameMismatch(
                spec.location().to_string(),
                reader.name().to_string(),
                spec.name().to_string(),
            ));
        }
        Ok(Box::new(ContainerSource { reader }))
    }
}

/// An opened container presented as an entry source.
#[derive(Debug)]
pub struct ContainerSource {
    reader: ContainerReader,
}

impl ContainerSource {
    pub fn reader(&self) -> &ContainerReader {
        &self.reader
    }
}

#[async_trait::async_trait]
impl EntrySource for ContainerSource {
    fn name(&self) -> &str {
        self.reader.name()
    }

    fn entry_count(&self) -> EntryIndex {
        self.reader.entry_count()
    }

    fn schema(&self) -> &Schema {
        self.reader.schema()
    }

    async fn read_cell(&self, row: EntryIndex, field: &str) -> SourceResult<CellValue> {
        let descriptor = self
            .reader
            .schema()
            .field(field)
            .ok_or_else(|| SourceError::FieldNotFound(field.to_string()))?;
        if row >= self.reader.entry_count() {
            return Err(SourceError::RowOutOfBounds(
                row,
                self.reader.name().to_string(),
                self.reader.entry_count(),
            ));
        }
        Ok(self.reader.read_cell(row, descriptor).await?)
    }
}
