//! In-memory sources, for tests and embedding.

use convoy_format::descriptor::Schema;
use convoy_format::index::EntryIndex;
use convoy_format::value::CellValue;
use indexmap::IndexMap;
use object_store::path::Path;

use crate::error::{SourceError, SourceResult};
use crate::spec::SourceSpec;
use crate::{EntrySource, SourceOpener};

/// Entry source holding its rows in memory.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    name: String,
    schema: Schema,
    columns: IndexMap<String, Vec<CellValue>>,
    rows: u64,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        let columns = schema
            .field_names()
            .map(|field| (field.to_string(), Vec::new()))
            .collect();
        Self {
            name: name.into(),
            schema,
            columns,
            rows: 0,
        }
    }

    /// Appends one row. Every schema field must be set exactly once.
    pub fn push_row(&mut self, cells: &[(&str, CellValue)]) -> SourceResult<()> {
        if cells.len() != self.schema.len() {
            return Err(SourceError::InvalidRow(
                self.name.clone(),
                format!(
                    "row sets {} cells, schema has {} fields",
                    cells.len(),
                    self.schema.len()
                ),
            ));
        }
        let mut staged: IndexMap<&str, &CellValue> = IndexMap::with_capacity(cells.len());
        for (field, cell) in cells {
            if !self.schema.contains(field) {
                return Err(SourceError::FieldNotFound(field.to_string()));
            }
            if staged.insert(*field, cell).is_some() {
                return Err(SourceError::InvalidRow(
                    self.name.clone(),
                    format!("row sets field \"{field}\" twice"),
                ));
            }
        }
        for (field, cell) in staged {
            if let Some(column) = self.columns.get_mut(field) {
                column.push(cell.clone());
            }
        }
        self.rows += 1;
        Ok(())
    }
}

#[async_trait::async_trait]
impl EntrySource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_count(&self) -> EntryIndex {
        self.rows
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read_cell(&self, row: EntryIndex, field: &str) -> SourceResult<CellValue> {
        let column = self
            .columns
            .get(field)
            .ok_or_else(|| SourceError::FieldNotFound(field.to_string()))?;
        if row >= self.rows {
            return Err(SourceError::RowOutOfBounds(row, self.name.clone(), self.rows));
        }
        Ok(column[row as usize].clone())
    }
}

/// Opener serving pre-registered in-memory sources by location.
#[derive(Debug, Default)]
pub struct InMemoryOpener {
    sources: IndexMap<Path, InMemorySource>,
}

impl InMemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, location: impl Into<Path>, source: InMemorySource) {
        self.sources.insert(location.into(), source);
    }
}

#[async_trait::async_trait]
impl SourceOpener for InMemoryOpener {
    async fn open(&self, spec: &SourceSpec) -> SourceResult<Box<dyn EntrySource>> {
        let source = self
            .sources
            .get(spec.location())
            .ok_or_else(|| SourceError::NotRegistered(spec.location().to_string()))?;
        if source.name() != spec.name() {
            return Err(SourceError::NameMismatch(
                spec.location().to_string(),
                source.name().to_string(),
                spec.name().to_string(),
            ));
        }
        Ok(Box::new(source.clone()))
    }
}
