//! Typed indices for the different numbering spaces of a container:
//! chain-wide entry positions, schema element handles, and cluster-relative
//! positions.

use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// Integer type long enough to hold the number of entries in a chain.
pub type EntryIndex = u64;

/// Reserved value marking an unset or exhausted entry position.
pub const INVALID_ENTRY_INDEX: EntryIndex = u64::MAX;

/// Distinguishes elements of the same kind within one container, e.g. two
/// clusters. Ids carry no meaning across containers.
pub type ElementId = u64;

/// Reserved value marking an unassigned element id.
pub const INVALID_ELEMENT_ID: ElementId = u64::MAX;

/// Addresses one entry relative to a particular cluster instead of through
/// the container-wide entry numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterIndex {
    cluster_id: ElementId,
    index: EntryIndex,
}

impl ClusterIndex {
    pub const fn new(cluster_id: ElementId, index: EntryIndex) -> Self {
        Self { cluster_id, index }
    }

    pub fn cluster_id(&self) -> ElementId {
        self.cluster_id
    }

    pub fn index(&self) -> EntryIndex {
        self.index
    }

    /// Returns the current position and steps past it, cursor style.
    pub fn post_increment(&mut self) -> ClusterIndex {
        let current = *self;
        self.index += 1;
        current
    }
}

impl Default for ClusterIndex {
    fn default() -> Self {
        Self::new(INVALID_ELEMENT_ID, INVALID_ENTRY_INDEX)
    }
}

impl Add<u64> for ClusterIndex {
    type Output = ClusterIndex;

    fn add(self, rhs: u64) -> ClusterIndex {
        ClusterIndex::new(self.cluster_id, self.index + rhs)
    }
}

impl Sub<u64> for ClusterIndex {
    type Output = ClusterIndex;

    fn sub(self, rhs: u64) -> ClusterIndex {
        ClusterIndex::new(self.cluster_id, self.index - rhs)
    }
}

impl AddAssign<u64> for ClusterIndex {
    fn add_assign(&mut self, rhs: u64) {
        self.index += rhs;
    }
}

/// A running element offset or count within one column. Wrapped in a named
/// type so index columns cannot be confused with plain integer payloads.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ColumnIndex(u64);

impl ColumnIndex {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Returns the current offset and steps past it, cursor style.
    pub fn post_increment(&mut self) -> ColumnIndex {
        let current = *self;
        self.0 += 1;
        current
    }
}

impl From<u64> for ColumnIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ColumnIndex> for u64 {
    fn from(value: ColumnIndex) -> Self {
        value.0
    }
}

impl Add<u64> for ColumnIndex {
    type Output = ColumnIndex;

    fn add(self, rhs: u64) -> ColumnIndex {
        ColumnIndex::new(self.0 + rhs)
    }
}

impl AddAssign<u64> for ColumnIndex {
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

/// One row of a variant column: the element offset within the active
/// alternative and the dispatch tag naming that alternative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSwitch {
    index: EntryIndex,
    tag: u32,
}

impl ColumnSwitch {
    pub const fn new(index: EntryIndex, tag: u32) -> Self {
        Self { index, tag }
    }

    pub fn index(&self) -> EntryIndex {
        self.index
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_index_defaults_to_invalid() {
        let index = ClusterIndex::default();
        assert_eq!(index.cluster_id(), INVALID_ELEMENT_ID);
        assert_eq!(index.index(), INVALID_ENTRY_INDEX);
    }

    #[test]
    fn cluster_index_arithmetic_stays_in_cluster() {
        let base = ClusterIndex::new(3, 10);
        assert_eq!(base + 5, ClusterIndex::new(3, 15));
        assert_eq!(base - 4, ClusterIndex::new(3, 6));

        let mut cursor = base;
        cursor += 2;
        assert_eq!(cursor, ClusterIndex::new(3, 12));
        assert_eq!(cursor.post_increment(), ClusterIndex::new(3, 12));
        assert_eq!(cursor, ClusterIndex::new(3, 13));
    }

    #[test]
    fn cluster_index_equality_needs_both_parts() {
        assert_ne!(ClusterIndex::new(1, 5), ClusterIndex::new(2, 5));
        assert_ne!(ClusterIndex::new(1, 5), ClusterIndex::new(1, 6));
        assert_eq!(ClusterIndex::new(1, 5), ClusterIndex::new(1, 5));
    }

    #[test]
    fn column_index_behaves_like_a_counter() {
        let mut offset = ColumnIndex::new(7);
        assert_eq!(offset.value(), 7);
        offset += 3;
        assert_eq!(offset, ColumnIndex::new(10));
        assert_eq!(offset.post_increment().value(), 10);
        assert_eq!(offset.value(), 11);
        assert_eq!(u64::from(offset + 1), 12);
    }

    #[test]
    fn column_switch_carries_offset_and_tag() {
        let switch = ColumnSwitch::new(42, 2);
        assert_eq!(switch.index(), 42);
        assert_eq!(switch.tag(), 2);
        assert_eq!(ColumnSwitch::default(), ColumnSwitch::new(0, 0));
    }
}
