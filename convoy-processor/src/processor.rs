//! Forward-only iteration over an ordered chain of sources.

use std::sync::Arc;

use convoy_format::descriptor::Schema;
use convoy_format::index::EntryIndex;
use convoy_sources::spec::SourceSpec;
use convoy_sources::{EntrySource, SourceOpener};

use crate::entry::Entry;
use crate::error::{ProcessorError, ProcessorResult};

/// Cursor presenting an ordered list of sources as one entry sequence.
///
/// The first source is opened at construction and anchors the chain; the
/// rest are opened the first time the cursor crosses into them. Sources
/// without entries contribute nothing and are skipped without error.
#[derive(Debug)]
pub struct ChainProcessor {
    opener: Arc<dyn SourceOpener>,
    specs: Vec<SourceSpec>,
    sources: Vec<Option<Box<dyn EntrySource>>>,
    active: usize,
    local: EntryIndex,
    global: EntryIndex,
    reference_schema: Schema,
}

impl ChainProcessor {
    /// Builds a processor over `specs`, opening the first source.
    ///
    /// The list must be non-empty and its first source must hold at
    /// least one entry; later sources may be empty.
    pub async fn new(
        opener: Arc<dyn SourceOpener>,
        specs: Vec<SourceSpec>,
    ) -> ProcessorResult<Self> {
        if specs.is_empty() {
            return Err(ProcessorError::Configuration(
                "at least one source must be provided".to_string(),
            ));
        }
        let first = opener.open(&specs[0]).await?;
        if first.entry_count() == 0 {
            return Err(ProcessorError::Configuration(
                "first source does not contain any entries".to_string(),
            ));
        }
        let reference_schema = first.schema().clone();
        let mut sources: Vec<Option<Box<dyn EntrySource>>> = Vec::new();
        sources.resize_with(specs.len(), || None);
        sources[0] = Some(first);
        tracing::debug!(sources = specs.len(), "chain processor ready");
        Ok(Self {
            opener,
            specs,
            sources,
            active: 0,
            local: 0,
            global: 0,
            reference_schema,
        })
    }

    /// Schema of the first source, the schema the chain was anchored on.
    ///
    /// Later sources may expose a different schema; entry views resolve
    /// fields against the active source, not against this one.
    pub fn reference_schema(&self) -> &Schema {
        &self.reference_schema
    }

    pub fn source_count(&self) -> usize {
        self.specs.len()
    }

    /// Position of the source the cursor currently sits on.
    pub fn active_source_index(&self) -> usize {
        self.active
    }

    /// Number of entries yielded so far.
    pub fn entries_processed(&self) -> EntryIndex {
        self.global
    }

    /// Advances the cursor and yields the next entry, or `None` once the
    /// last source is exhausted. The end state is stable: further calls
    /// keep returning `None`.
    ///
    /// Crossing into a source opens it if needed; open failures
    /// propagate and leave the cursor where it was.
    pub async fn next_entry(&mut self) -> ProcessorResult<Option<Entry<'_>>> {
        loop {
            self.ensure_open(self.active).await?;
            let remaining = self.sources[self.active]
                .as_deref()
                .expect("source opened above")
                .entry_count();
            if self.local < remaining {
                let global = self.global;
                let local = self.local;
                self.global += 1;
                self.local += 1;
                let source = self.sources[self.active]
                    .as_deref()
                    .expect("source opened above");
                return Ok(Some(Entry::new(source, global, local)));
            }
            if self.active + 1 == self.specs.len() {
                return Ok(None);
            }
            self.active += 1;
            self.local = 0;
        }
    }

    async fn ensure_open(&mut self, position: usize) -> ProcessorResult<()> {
        if self.sources[position].is_none() {
            let spec = &self.specs[position];
            tracing::debug!(source = %spec, position, "opening chained source");
            let source = self.opener.open(spec).await?;
            self.sources[position] = Some(source);
        }
        Ok(())
    }
}
