//! Container metadata: the schema, the clusters, and the page locators
//! addressing each field's stored cells.

use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::column::{ColumnType, StructureKind};
use crate::error::{FormatError, FormatResult};
use crate::index::{ColumnIndex, ElementId, EntryIndex};
use crate::layout::FORMAT_VERSION;
use crate::locator::Locator;
use crate::naming::ensure_valid_name;
use crate::range::{ClusterRange, GlobalRange};

/// One named, typed field of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub column_type: ColumnType,
    pub structure: StructureKind,
    /// Leaf encoding of the elements, for collection fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ColumnType>,
}

impl FieldDescriptor {
    pub fn leaf(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            structure: StructureKind::Leaf,
            element_type: None,
        }
    }

    /// Collection field backed by a 64-bit offset column.
    pub fn collection(name: impl Into<String>, element_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Index64,
            structure: StructureKind::Collection,
            element_type: Some(element_type),
        }
    }

    /// Variant field backed by a switch column.
    pub fn variant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Switch,
            structure: StructureKind::Variant,
            element_type: None,
        }
    }
}

/// The fields a container exposes, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldDescriptor>,
}

impl Schema {
    /// Builds a schema, rejecting invalid names, duplicates, and field
    /// shapes a container cannot store.
    pub fn from_fields<I: IntoIterator<Item = FieldDescriptor>>(fields: I) -> FormatResult<Self> {
        let mut collected = IndexMap::new();
        for field in fields {
            ensure_valid_name(&field.name, "field name")?;
            validate_field_shape(&field)?;
            let name = field.name.clone();
            if collected.insert(name.clone(), field).is_some() {
                return Err(FormatError::DuplicateField(name));
            }
        }
        Ok(Self { fields: collected })
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

fn validate_field_shape(field: &FieldDescriptor) -> FormatResult<()> {
    if field.column_type == ColumnType::Unknown {
        return Err(FormatError::InvalidField(
            field.name.clone(),
            "column type cannot be unknown",
        ));
    }
    match field.structure {
        StructureKind::Leaf => {
            if field.column_type == ColumnType::Switch {
                return Err(FormatError::InvalidField(
                    field.name.clone(),
                    "switch columns belong to variant fields",
                ));
            }
            if field.element_type.is_some() {
                return Err(FormatError::InvalidField(
                    field.name.clone(),
                    "only collection fields declare an element type",
                ));
            }
        }
        StructureKind::Collection => {
            if !field.column_type.is_index() {
                return Err(FormatError::InvalidField(
                    field.name.clone(),
                    "collection fields use an index column",
                ));
            }
            match field.element_type {
                None => {
                    return Err(FormatError::InvalidField(
                        field.name.clone(),
                        "collection fields must declare an element type",
                    ));
                }
                Some(ColumnType::Unknown) => {
                    return Err(FormatError::InvalidField(
                        field.name.clone(),
                        "element type cannot be unknown",
                    ));
                }
                Some(_) => {}
            }
        }
        StructureKind::Variant => {
            if field.column_type != ColumnType::Switch {
                return Err(FormatError::InvalidField(
                    field.name.clone(),
                    "variant fields use the switch column",
                ));
            }
            if field.element_type.is_some() {
                return Err(FormatError::InvalidField(
                    field.name.clone(),
                    "only collection fields declare an element type",
                ));
            }
        }
        _ => {
            return Err(FormatError::InvalidField(
                field.name.clone(),
                "containers store leaf, collection and variant fields",
            ));
        }
    }
    Ok(())
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.fields.values())
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Vec::<FieldDescriptor>::deserialize(deserializer)?;
        Schema::from_fields(fields).map_err(D::Error::custom)
    }
}

/// One locator-addressed run of cells for a single field within a cluster.
/// Element offsets are local to the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub field: String,
    pub first_element: ColumnIndex,
    pub n_elements: ColumnIndex,
    pub locator: Locator,
}

impl PageDescriptor {
    pub fn covers(&self, element: u64) -> bool {
        element >= self.first_element.value()
            && element < self.first_element.value() + self.n_elements.value()
    }
}

/// One contiguous block of entries and the pages storing its cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    pub cluster_id: ElementId,
    pub first_entry: EntryIndex,
    pub entry_count: u64,
    pub pages: Vec<PageDescriptor>,
}

impl ClusterDescriptor {
    /// Entries of this cluster in chain-wide numbering.
    pub fn global_range(&self) -> GlobalRange {
        GlobalRange::new(self.first_entry, self.first_entry + self.entry_count)
    }

    /// Entries of this cluster in cluster-local numbering.
    pub fn cluster_range(&self) -> ClusterRange {
        ClusterRange::new(self.cluster_id, 0, self.entry_count)
    }

    pub fn pages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a PageDescriptor> {
        self.pages.iter().filter(move |page| page.field == field)
    }

    pub fn page_covering<'a>(&'a self, field: &'a str, element: u64) -> Option<&'a PageDescriptor> {
        self.pages_for(field).find(|page| page.covers(element))
    }
}

/// Top-level container metadata, the content of `descriptor.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDescriptor {
    pub format_version: u32,
    pub name: String,
    pub entry_count: u64,
    pub schema: Schema,
    pub clusters: Vec<ClusterDescriptor>,
}

impl ContainerDescriptor {
    /// Range covering every entry of the container.
    pub fn entry_range(&self) -> GlobalRange {
        GlobalRange::new(0, self.entry_count)
    }

    /// The cluster holding `entry`, if any. Relies on the cluster order
    /// checked by [`ContainerDescriptor::validate`].
    pub fn cluster_containing(&self, entry: EntryIndex) -> Option<&ClusterDescriptor> {
        let candidate = self
            .clusters
            .partition_point(|cluster| cluster.first_entry <= entry);
        let cluster = self.clusters.get(candidate.checked_sub(1)?)?;
        cluster.global_range().contains(entry).then_some(cluster)
    }

    /// Structural invariants every descriptor must satisfy: a supported
    /// version, a valid name, clusters tiling `[0, entry_count)`, and per
    /// field pages tiling each cluster.
    pub fn validate(&self) -> FormatResult<()> {
        if self.format_version == 0 {
            return Err(FormatError::DescriptorCorrupt(
                "format version 0 is not assigned".to_string(),
            ));
        }
        if self.format_version > FORMAT_VERSION {
            return Err(FormatError::DescriptorVersion(
                self.format_version,
                FORMAT_VERSION,
            ));
        }
        ensure_valid_name(&self.name, "container name")?;

        let mut next_entry: EntryIndex = 0;
        for cluster in &self.clusters {
            if cluster.first_entry != next_entry {
                return Err(FormatError::DescriptorCorrupt(format!(
                    "cluster {} starts at entry {}, expected {}",
                    cluster.cluster_id, cluster.first_entry, next_entry
                )));
            }
            if cluster.entry_count == 0 {
                return Err(FormatError::DescriptorCorrupt(format!(
                    "cluster {} holds no entries",
                    cluster.cluster_id
                )));
            }
            self.validate_cluster_pages(cluster)?;
            next_entry += cluster.entry_count;
        }
        if next_entry != self.entry_count {
            return Err(FormatError::DescriptorCorrupt(format!(
                "clusters cover {} entries, descriptor claims {}",
                next_entry, self.entry_count
            )));
        }

        let mut seen_ids: Vec<ElementId> = self.clusters.iter().map(|c| c.cluster_id).collect();
        seen_ids.sort_unstable();
        seen_ids.dedup();
        if seen_ids.len() != self.clusters.len() {
            return Err(FormatError::DescriptorCorrupt(
                "cluster ids are not unique".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_cluster_pages(&self, cluster: &ClusterDescriptor) -> FormatResult<()> {
        for page in &cluster.pages {
            if !self.schema.contains(&page.field) {
                return Err(FormatError::DescriptorCorrupt(format!(
                    "cluster {} has a page for unknown field \"{}\"",
                    cluster.cluster_id, page.field
                )));
            }
            if page.n_elements.value() == 0 {
                return Err(FormatError::DescriptorCorrupt(format!(
                    "cluster {} has an empty page for field \"{}\"",
                    cluster.cluster_id, page.field
                )));
            }
        }
        for field in self.schema.field_names() {
            let mut expected: u64 = 0;
            for page in cluster.pages_for(field) {
                if page.first_element.value() != expected {
                    return Err(FormatError::DescriptorCorrupt(format!(
                        "pages for field \"{}\" in cluster {} do not tile: element {} follows {}",
                        field,
                        cluster.cluster_id,
                        page.first_element.value(),
                        expected
                    )));
                }
                expected += page.n_elements.value();
            }
            if expected != cluster.entry_count {
                return Err(FormatError::DescriptorCorrupt(format!(
                    "pages for field \"{}\" cover {} of {} entries in cluster {}",
                    field, expected, cluster.entry_count, cluster.cluster_id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_field_schema() -> Schema {
        Schema::from_fields([
            FieldDescriptor::leaf("x", ColumnType::Real32),
            FieldDescriptor::collection("y", ColumnType::Real32),
        ])
        .expect("valid schema")
    }

    fn page(field: &str, first: u64, count: u64, offset: u64) -> PageDescriptor {
        PageDescriptor {
            field: field.to_string(),
            first_element: ColumnIndex::new(first),
            n_elements: ColumnIndex::new(count),
            locator: Locator::from_offset(offset, count * 8),
        }
    }

    fn descriptor() -> ContainerDescriptor {
        ContainerDescriptor {
            format_version: FORMAT_VERSION,
            name: "events".to_string(),
            entry_count: 5,
            schema: two_field_schema(),
            clusters: vec![
                ClusterDescriptor {
                    cluster_id: 0,
                    first_entry: 0,
                    entry_count: 3,
                    pages: vec![page("x", 0, 3, 0), page("y", 0, 3, 24)],
                },
                ClusterDescriptor {
                    cluster_id: 1,
                    first_entry: 3,
                    entry_count: 2,
                    pages: vec![page("x", 0, 2, 48), page("y", 0, 2, 64)],
                },
            ],
        }
    }

    #[test]
    fn schema_preserves_declaration_order() {
        let schema = two_field_schema();
        let names: Vec<_> = schema.field_names().collect();
        assert_eq!(names, vec!["x", "y"]);
        assert!(schema.contains("y"));
        assert!(schema.field("z").is_none());
    }

    #[test]
    fn schema_rejects_duplicates_and_bad_shapes() {
        let err = Schema::from_fields([
            FieldDescriptor::leaf("x", ColumnType::Real32),
            FieldDescriptor::leaf("x", ColumnType::Real64),
        ])
        .expect_err("duplicate");
        assert!(matches!(err, FormatError::DuplicateField(_)));

        assert!(Schema::from_fields([FieldDescriptor::leaf("a.b", ColumnType::Bit)]).is_err());
        assert!(Schema::from_fields([FieldDescriptor::leaf("x", ColumnType::Unknown)]).is_err());
        assert!(Schema::from_fields([FieldDescriptor::leaf("x", ColumnType::Switch)]).is_err());

        let mut collection = FieldDescriptor::collection("hits", ColumnType::Real32);
        collection.element_type = None;
        assert!(Schema::from_fields([collection]).is_err());
    }

    #[test]
    fn valid_descriptors_pass_validation() {
        descriptor().validate().expect("valid descriptor");
    }

    #[test]
    fn cluster_lookup_maps_entries_to_their_block() {
        let descriptor = descriptor();
        assert_eq!(descriptor.cluster_containing(0).expect("first").cluster_id, 0);
        assert_eq!(descriptor.cluster_containing(2).expect("edge").cluster_id, 0);
        assert_eq!(descriptor.cluster_containing(3).expect("second").cluster_id, 1);
        assert_eq!(descriptor.cluster_containing(4).expect("last").cluster_id, 1);
        assert!(descriptor.cluster_containing(5).is_none());
    }

    #[test]
    fn page_lookup_respects_element_ranges() {
        let descriptor = descriptor();
        let cluster = &descriptor.clusters[0];
        assert!(cluster.page_covering("x", 2).is_some());
        assert!(cluster.page_covering("x", 3).is_none());
        assert!(cluster.page_covering("missing", 0).is_none());
        assert_eq!(cluster.global_range(), GlobalRange::new(0, 3));
        assert_eq!(cluster.cluster_range().size(), 3);
    }

    #[test]
    fn validation_spots_gaps_and_miscounts() {
        let mut gap = descriptor();
        gap.clusters[1].first_entry = 4;
        assert!(matches!(
            gap.validate(),
            Err(FormatError::DescriptorCorrupt(_))
        ));

        let mut short = descriptor();
        short.entry_count = 6;
        assert!(short.validate().is_err());

        let mut page_gap = descriptor();
        page_gap.clusters[0].pages[0].n_elements = ColumnIndex::new(2);
        assert!(page_gap.validate().is_err());

        let mut duplicate_id = descriptor();
        duplicate_id.clusters[1].cluster_id = 0;
        assert!(duplicate_id.validate().is_err());
    }

    #[test]
    fn future_versions_are_refused() {
        let mut future = descriptor();
        future.format_version = FORMAT_VERSION + 1;
        assert!(matches!(
            future.validate(),
            Err(FormatError::DescriptorVersion(_, _))
        ));
    }

    #[test]
    fn descriptors_parse_from_their_wire_shape() {
        let json = r#"{
            "format_version": 1,
            "name": "events",
            "entry_count": 2,
            "schema": [
                {"name": "x", "column_type": 8, "structure": 1},
                {"name": "y", "column_type": 1, "structure": 2, "element_type": 8}
            ],
            "clusters": [{
                "cluster_id": 0,
                "first_entry": 0,
                "entry_count": 2,
                "pages": [
                    {"field": "x", "first_element": 0, "n_elements": 2,
                     "locator": {"kind": 0, "reserved": 0, "bytes": 10, "position": 0}},
                    {"field": "y", "first_element": 0, "n_elements": 2,
                     "locator": {"kind": 0, "reserved": 0, "bytes": 14, "position": 10}}
                ]
            }]
        }"#;
        let parsed: ContainerDescriptor = serde_json::from_str(json).expect("parse descriptor");
        parsed.validate().expect("valid");
        assert_eq!(parsed.schema.field("x").expect("x").column_type, ColumnType::Real32);
        let y = parsed.schema.field("y").expect("y");
        assert_eq!(y.structure, StructureKind::Collection);
        assert_eq!(y.element_type, Some(ColumnType::Real32));
        assert_eq!(
            parsed.clusters[0].pages[1].locator.offset().expect("offset"),
            10
        );

        let round_trip = serde_json::to_string(&parsed).expect("serialize");
        let reparsed: ContainerDescriptor = serde_json::from_str(&round_trip).expect("reparse");
        assert_eq!(reparsed, parsed);
    }
}
