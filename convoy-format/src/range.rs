//! Lazy forward ranges over the entry numbering spaces.
//!
//! Ranges are cheap half-open intervals; iterating one yields indices
//! without touching storage, so higher layers can drive their own I/O from
//! the positions.

use crate::index::{ClusterIndex, ElementId, EntryIndex, INVALID_ENTRY_INDEX};

/// Half-open interval `[start, end)` of chain-wide entry indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalRange {
    start: EntryIndex,
    end: EntryIndex,
}

impl GlobalRange {
    /// Callers must pass `start <= end`; `size` underflows otherwise.
    pub const fn new(start: EntryIndex, end: EntryIndex) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> EntryIndex {
        self.start
    }

    pub fn end(&self) -> EntryIndex {
        self.end
    }

    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_valid(&self) -> bool {
        self.start != INVALID_ENTRY_INDEX && self.end != INVALID_ENTRY_INDEX
    }

    pub fn contains(&self, index: EntryIndex) -> bool {
        index >= self.start && index < self.end
    }

    pub fn iter(&self) -> GlobalRangeIter {
        GlobalRangeIter {
            current: self.start,
            end: self.end,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GlobalRangeIter {
    current: EntryIndex,
    end: EntryIndex,
}

impl Iterator for GlobalRangeIter {
    type Item = EntryIndex;

    fn next(&mut self) -> Option<EntryIndex> {
        if self.current < self.end {
            let index = self.current;
            self.current += 1;
            Some(index)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.current) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GlobalRangeIter {}

impl IntoIterator for GlobalRange {
    type Item = EntryIndex;
    type IntoIter = GlobalRangeIter;

    fn into_iter(self) -> GlobalRangeIter {
        self.iter()
    }
}

impl IntoIterator for &GlobalRange {
    type Item = EntryIndex;
    type IntoIter = GlobalRangeIter;

    fn into_iter(self) -> GlobalRangeIter {
        self.iter()
    }
}

/// Half-open interval of cluster-local entry positions, bound to one
/// cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterRange {
    cluster_id: ElementId,
    start: EntryIndex,
    end: EntryIndex,
}

impl ClusterRange {
    /// Callers must pass `start <= end`; `size` underflows otherwise.
    pub const fn new(cluster_id: ElementId, start: EntryIndex, end: EntryIndex) -> Self {
        Self {
            cluster_id,
            start,
            end,
        }
    }

    pub fn cluster_id(&self) -> ElementId {
        self.cluster_id
    }

    pub fn start(&self) -> EntryIndex {
        self.start
    }

    pub fn end(&self) -> EntryIndex {
        self.end
    }

    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_valid(&self) -> bool {
        self.start != INVALID_ENTRY_INDEX && self.end != INVALID_ENTRY_INDEX
    }

    pub fn iter(&self) -> ClusterRangeIter {
        ClusterRangeIter {
            current: ClusterIndex::new(self.cluster_id, self.start),
            end: self.end,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClusterRangeIter {
    current: ClusterIndex,
    end: EntryIndex,
}

impl Iterator for ClusterRangeIter {
    type Item = ClusterIndex;

    fn next(&mut self) -> Option<ClusterIndex> {
        if self.current.index() < self.end {
            Some(self.current.post_increment())
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.current.index()) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ClusterRangeIter {}

impl IntoIterator for ClusterRange {
    type Item = ClusterIndex;
    type IntoIter = ClusterRangeIter;

    fn into_iter(self) -> ClusterRangeIter {
        self.iter()
    }
}

impl IntoIterator for &ClusterRange {
    type Item = ClusterIndex;
    type IntoIter = ClusterRangeIter;

    fn into_iter(self) -> ClusterRangeIter {
        self.iter()
    }
}
