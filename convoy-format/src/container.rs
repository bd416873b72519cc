//! Authoring and opening container directories on an object store.
//!
//! A container is a directory holding `descriptor.json` and `pages.blob`.
//! The writer stages encoded cells per field, cuts them into pages when a
//! cluster is committed, and uploads both objects on `finish()`. The reader
//! fetches the descriptor once and then resolves individual cells through
//! the page locators, fetching only the byte ranges it needs.

use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;
use object_store::{ObjectStore, PutPayload};
use serde_json::Value as JsonValue;

use crate::descriptor::{
    ClusterDescriptor, ContainerDescriptor, FieldDescriptor, PageDescriptor, Schema,
};
use crate::error::{FormatError, FormatResult};
use crate::index::{ColumnIndex, ElementId, EntryIndex};
use crate::layout::{DESCRIPTOR_FILE, FORMAT_VERSION, PAGES_BLOB_FILE};
use crate::locator::{Locator, LocatorKind};
use crate::range::GlobalRange;
use crate::value::{decode_cell, default_cell, encode_cell, CellValue};

/// Options controlling the shape of written containers.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Maximum number of cells per page. Committed clusters are cut into
    /// pages of at most this many rows per field.
    pub max_page_rows: u64,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            max_page_rows: 4096,
        }
    }
}

/// Writer that stages entries, cuts them into clusters and pages, and
/// uploads the finished container to an object store.
pub struct ContainerWriter {
    store: Arc<dyn ObjectStore>,
    dir: object_store::path::Path,
    name: String,
    schema: Schema,
    options: WriterOptions,
    /// Encoded cells per field for the cluster currently being staged.
    staged: IndexMap<String, Vec<JsonValue>>,
    staged_rows: u64,
    /// Concatenated page payloads of all committed clusters.
    blob: Vec<u8>,
    clusters: Vec<ClusterDescriptor>,
    next_cluster_id: ElementId,
    total_entries: u64,
}

impl ContainerWriter {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        dir: object_store::path::Path,
        name: impl Into<String>,
        schema: Schema,
        options: WriterOptions,
    ) -> FormatResult<Self> {
        let name = name.into();
        crate::naming::ensure_valid_name(&name, "container name")?;
        let staged = schema
            .field_names()
            .map(|field| (field.to_string(), Vec::new()))
            .collect();
        Ok(Self {
            store,
            dir,
            name,
            schema,
            options,
            staged,
            staged_rows: 0,
            blob: Vec::new(),
            clusters: Vec::new(),
            next_cluster_id: 0,
            total_entries: 0,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Rows staged for the cluster that has not been committed yet.
    pub fn staged_rows(&self) -> u64 {
        self.staged_rows
    }

    /// Rows already committed into clusters.
    pub fn total_entries(&self) -> u64 {
        self.total_entries
    }

    /// Stages one entry. Every schema field must be set exactly once; cells
    /// are validated against their field right away.
    pub fn append_row(&mut self, cells: &[(&str, CellValue)]) -> FormatResult<()> {
        let mut encoded: IndexMap<&str, JsonValue> = IndexMap::with_capacity(cells.len());
        for (name, cell) in cells {
            let field = self.schema.field(name).ok_or_else(|| {
                FormatError::InvalidField(name.to_string(), "field is not part of the schema")
            })?;
            let value = encode_cell(field, cell)?;
            if encoded.insert(*name, value).is_some() {
                return Err(FormatError::InvalidField(
                    name.to_string(),
                    "row sets this field twice",
                ));
            }
        }
        if encoded.len() != self.schema.len() {
            let missing = self
                .schema
                .field_names()
                .find(|field| !encoded.contains_key(field))
                .unwrap_or_default();
            return Err(FormatError::InvalidField(
                missing.to_string(),
                "row is missing a cell for this field",
            ));
        }
        for (name, value) in encoded {
            if let Some(column) = self.staged.get_mut(name) {
                column.push(value);
            }
        }
        self.staged_rows += 1;
        Ok(())
    }

    /// Closes the staged rows into a cluster, cutting each field into pages
    /// of at most `max_page_rows` cells. Staging nothing is a no-op.
    pub fn commit_cluster(&mut self) -> FormatResult<()> {
        if self.staged_rows == 0 {
            return Ok(());
        }
        let rows_per_page = self.options.max_page_rows.max(1) as usize;
        let mut pages = Vec::new();
        for (field, column) in &mut self.staged {
            let cells = std::mem::take(column);
            for (chunk_index, chunk) in cells.chunks(rows_per_page).enumerate() {
                let payload = serde_json::to_vec(&chunk)
                    .map_err(|source| FormatError::PageEncode(field.clone(), source))?;
                let locator = Locator::from_offset(self.blob.len() as u64, payload.len() as u64);
                self.blob.extend_from_slice(&payload);
                pages.push(PageDescriptor {
                    field: field.clone(),
                    first_element: ColumnIndex::new((chunk_index * rows_per_page) as u64),
                    n_elements: ColumnIndex::new(chunk.len() as u64),
                    locator,
                });
            }
        }
        self.clusters.push(ClusterDescriptor {
            cluster_id: self.next_cluster_id,
            first_entry: self.total_entries,
            entry_count: self.staged_rows,
            pages,
        });
        self.next_cluster_id += 1;
        self.total_entries += self.staged_rows;
        self.staged_rows = 0;
        Ok(())
    }

    /// Commits the open cluster and uploads `pages.blob` and
    /// `descriptor.json`. The blob goes first so a stored descriptor never
    /// references missing bytes.
    pub async fn finish(mut self) -> FormatResult<ContainerDescriptor> {
        self.commit_cluster()?;
        let descriptor = ContainerDescriptor {
            format_version: FORMAT_VERSION,
            name: self.name,
            entry_count: self.total_entries,
            schema: self.schema,
            clusters: self.clusters,
        };
        descriptor.validate()?;

        let blob_path = self.dir.child(PAGES_BLOB_FILE);
        self.store
            .put(&blob_path, PutPayload::from_bytes(Bytes::from(self.blob)))
            .await
            .map_err(|source| FormatError::ContainerWrite(blob_path.to_string(), source))?;

        let descriptor_payload =
            serde_json::to_vec(&descriptor).map_err(FormatError::DescriptorSerialize)?;
        let descriptor_path = self.dir.child(DESCRIPTOR_FILE);
        self.store
            .put(
                &descriptor_path,
                PutPayload::from_bytes(Bytes::from(descriptor_payload)),
            )
            .await
            .map_err(|source| FormatError::ContainerWrite(descriptor_path.to_string(), source))?;

        tracing::debug!(
            container = %self.dir,
            entries = descriptor.entry_count,
            clusters = descriptor.clusters.len(),
            "wrote container"
        );
        Ok(descriptor)
    }
}

/// Reader over one container directory. Opening fetches and validates the
/// descriptor; cell reads fetch page byte ranges on demand.
#[derive(Debug)]
pub struct ContainerReader {
    store: Arc<dyn ObjectStore>,
    path: object_store::path::Path,
    descriptor: ContainerDescriptor,
}

impl ContainerReader {
    pub async fn open(
        store: Arc<dyn ObjectStore>,
        path: object_store::path::Path,
    ) -> FormatResult<Self> {
        let descriptor_path = path.child(DESCRIPTOR_FILE);
        let object = store
            .get(&descriptor_path)
            .await
            .map_err(|source| FormatError::DescriptorFetch(descriptor_path.to_string(), source))?;
        let payload = object
            .bytes()
            .await
            .map_err(|source| FormatError::DescriptorFetch(descriptor_path.to_string(), source))?;
        let descriptor: ContainerDescriptor = serde_json::from_slice(&payload)
            .map_err(|source| FormatError::DescriptorParse(descriptor_path.to_string(), source))?;
        descriptor.validate()?;
        tracing::debug!(
            container = %path,
            name = %descriptor.name,
            entries = descriptor.entry_count,
            "opened container"
        );
        Ok(Self {
            store,
            path,
            descriptor,
        })
    }

    pub fn descriptor(&self) -> &ContainerDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn entry_count(&self) -> u64 {
        self.descriptor.entry_count
    }

    pub fn schema(&self) -> &Schema {
        &self.descriptor.schema
    }

    pub fn entry_range(&self) -> GlobalRange {
        self.descriptor.entry_range()
    }

    /// Materializes one cell.
    pub async fn read_cell(
        &self,
        row: EntryIndex,
        field: &FieldDescriptor,
    ) -> FormatResult<CellValue> {
        if row >= self.descriptor.entry_count {
            return Err(FormatError::RowOutOfBounds(row, self.descriptor.entry_count));
        }
        let cluster = self.descriptor.cluster_containing(row).ok_or_else(|| {
            FormatError::DescriptorCorrupt(format!("no cluster covers entry {row}"))
        })?;
        let local = row - cluster.first_entry;
        let page = cluster.page_covering(&field.name, local).ok_or_else(|| {
            FormatError::PageNotFound(field.name.clone(), cluster.cluster_id, local)
        })?;
        let mut cells = self.fetch_page(page, field).await?;
        let offset = (local - page.first_element.value()) as usize;
        Ok(cells.swap_remove(offset))
    }

    /// Materializes the cells of `field` for every entry in `range`,
    /// fetching the covering pages concurrently.
    pub async fn read_span(
        &self,
        field: &FieldDescriptor,
        range: GlobalRange,
    ) -> FormatResult<Vec<CellValue>> {
        if !range.is_valid() || range.end() > self.descriptor.entry_count {
            return Err(FormatError::RowOutOfBounds(
                range.end().saturating_sub(1),
                self.descriptor.entry_count,
            ));
        }
        if range.size() == 0 {
            return Ok(Vec::new());
        }

        let mut jobs: Vec<(&PageDescriptor, std::ops::Range<usize>)> = Vec::new();
        for cluster in &self.descriptor.clusters {
            let block = cluster.global_range();
            if block.end() <= range.start() || block.start() >= range.end() {
                continue;
            }
            let local_start = range.start().max(block.start()) - cluster.first_entry;
            let local_end = range.end().min(block.end()) - cluster.first_entry;
            for page in cluster.pages_for(&field.name) {
                let page_start = page.first_element.value();
                let page_end = page_start + page.n_elements.value();
                if page_end <= local_start || page_start >= local_end {
                    continue;
                }
                let from = (local_start.max(page_start) - page_start) as usize;
                let to = (local_end.min(page_end) - page_start) as usize;
                jobs.push((page, from..to));
            }
        }

        let fetched = futures::future::try_join_all(
            jobs.iter().map(|(page, _)| self.fetch_page(page, field)),
        )
        .await?;

        let mut cells = Vec::with_capacity(range.size() as usize);
        for ((_, slice), page_cells) in jobs.into_iter().zip(fetched) {
            let take = slice.end - slice.start;
            cells.extend(page_cells.into_iter().skip(slice.start).take(take));
        }
        if cells.len() != range.size() as usize {
            return Err(FormatError::DescriptorCorrupt(format!(
                "span {}..{} of field \"{}\" resolved {} cells",
                range.start(),
                range.end(),
                field.name,
                cells.len()
            )));
        }
        Ok(cells)
    }

    /// Fetches and decodes one page. Pages of zeros are synthesized without
    /// touching the store.
    async fn fetch_page(
        &self,
        page: &PageDescriptor,
        field: &FieldDescriptor,
    ) -> FormatResult<Vec<CellValue>> {
        if page.locator.kind() == LocatorKind::PageZero {
            return Ok(vec![default_cell(field); page.n_elements.value() as usize]);
        }
        let offset = page.locator.offset()? as usize;
        let length = page.locator.n_bytes_on_storage() as usize;
        let blob_path = self.path.child(PAGES_BLOB_FILE);
        let payload = self
            .store
            .get_range(&blob_path, offset..offset + length)
            .await
            .map_err(|source| FormatError::PageFetch(blob_path.to_string(), source))?;
        let values: Vec<JsonValue> = serde_json::from_slice(&payload).map_err(|source| {
            FormatError::PageDecode(field.name.clone(), source.to_string())
        })?;
        if values.len() != page.n_elements.value() as usize {
            return Err(FormatError::PageDecode(
                field.name.clone(),
                format!(
                    "payload holds {} cells, page descriptor claims {}",
                    values.len(),
                    page.n_elements.value()
                ),
            ));
        }
        values
            .iter()
            .map(|value| decode_cell(field, value))
            .collect()
    }
}
