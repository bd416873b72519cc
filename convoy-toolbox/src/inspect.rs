use std::sync::Arc;

use convoy_format::container::ContainerReader;
use convoy_format::descriptor::Schema;
use convoy_format::layout::CONTAINER_EXT;
use convoy_format::range::GlobalRange;
use convoy_format::value::CellValue;
use object_store::ObjectStore;

/// Prints the descriptor of a stored container.
pub async fn inspect(name: String) -> anyhow::Result<()> {
    let reader = open(&name).await?;
    let descriptor = reader.descriptor();

    println!("Container: {}", descriptor.name);
    println!("Format Version: {}", descriptor.format_version);
    println!("Entries: {}", descriptor.entry_count);
    println!("Schema: {:#?}", SimpleSchema::from(reader.schema()));
    for cluster in &descriptor.clusters {
        println!(
            "Cluster {}: entries {}..{}, {} pages",
            cluster.cluster_id,
            cluster.global_range().start(),
            cluster.global_range().end(),
            cluster.pages.len()
        );
    }
    Ok(())
}

/// Prints the first `entries` rows of a stored container.
pub async fn head(name: String, entries: u64) -> anyhow::Result<()> {
    let reader = open(&name).await?;
    let range = GlobalRange::new(0, entries.min(reader.entry_count()));

    let mut columns: Vec<(String, Vec<CellValue>)> = Vec::new();
    for field in reader.schema().iter() {
        let cells = reader.read_span(field, range).await?;
        columns.push((field.name.clone(), cells));
    }
    for row in 0..range.size() as usize {
        let cells: Vec<String> = columns
            .iter()
            .map(|(name, cells)| format!("{name}={:?}", cells[row]))
            .collect();
        println!("[{row}] {}", cells.join(" "));
    }
    Ok(())
}

async fn open(name: &str) -> anyhow::Result<ContainerReader> {
    let store: Arc<dyn ObjectStore> = convoy_config::OBJECT_STORE_LOCAL_FS.clone();
    let dir = convoy_config::CONTAINERS_DIR_PREFIX.child(format!("{name}.{CONTAINER_EXT}"));
    Ok(ContainerReader::open(store, dir).await?)
}

#[derive(Debug)]
struct SimpleSchema {
    fields: Vec<SimpleField>,
}

impl From<&Schema> for SimpleSchema {
    fn from(schema: &Schema) -> Self {
        SimpleSchema {
            fields: schema
                .iter()
                .map(|field| SimpleField {
                    name: field.name.clone(),
                    column_type: field.column_type.to_string(),
                    structure: field.structure.to_string(),
                    element_type: field.element_type.map(|element| element.to_string()),
                })
                .collect(),
        }
    }
}

#[derive(Debug)]
struct SimpleField {
    name: String,
    column_type: String,
    structure: String,
    element_type: Option<String>,
}
