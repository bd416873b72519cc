//! Sources of entries and the seam through which processors reach them.
//!
//! An [`EntrySource`] is one opened, physical store of entries: it knows its
//! name, its schema, how many entries it holds, and how to materialize one
//! cell. A [`SourceOpener`] turns [`spec::SourceSpec`]s into opened sources;
//! chains hold specs and open them as iteration progresses.

use convoy_format::descriptor::Schema;
use convoy_format::index::EntryIndex;
use convoy_format::range::GlobalRange;
use convoy_format::value::CellValue;

pub mod container_format;
pub mod error;
pub mod memory;
pub mod spec;

use error::SourceResult;
use spec::SourceSpec;

/// One opened physical source of entries. Handles exclusively own their
/// underlying resources and release them on drop.
#[async_trait::async_trait]
pub trait EntrySource: std::fmt::Debug + Send + Sync {
    /// Logical name the source carries.
    fn name(&self) -> &str;

    /// Number of entries the source holds.
    fn entry_count(&self) -> EntryIndex;

    /// The source's schema, fixed at open time.
    fn schema(&self) -> &Schema;

    /// Range covering every local entry position.
    fn entry_range(&self) -> GlobalRange {
        GlobalRange::new(0, self.entry_count())
    }

    /// Materializes one cell. `row` is local to this source.
    async fn read_cell(&self, row: EntryIndex, field: &str) -> SourceResult<CellValue>;
}

/// Opens the source a spec names.
#[async_trait::async_trait]
pub trait SourceOpener: std::fmt::Debug + Send + Sync {
    async fn open(&self, spec: &SourceSpec) -> SourceResult<Box<dyn EntrySource>>;
}
