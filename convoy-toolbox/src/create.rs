use std::sync::Arc;

use convoy_format::column::ColumnType;
use convoy_format::container::{ContainerWriter, WriterOptions};
use convoy_format::descriptor::{FieldDescriptor, Schema};
use convoy_format::layout::CONTAINER_EXT;
use convoy_format::value::CellValue;
use object_store::ObjectStore;

/// Writes a demo container of `entries` rows, cutting a cluster every
/// `cluster_size` rows. Rows hold x = f32(i) and y = [x, 2x].
pub async fn create(name: String, entries: u64, cluster_size: u64) -> anyhow::Result<()> {
    let store: Arc<dyn ObjectStore> = convoy_config::OBJECT_STORE_LOCAL_FS.clone();
    let dir = convoy_config::CONTAINERS_DIR_PREFIX.child(format!("{name}.{CONTAINER_EXT}"));

    let schema = Schema::from_fields([
        FieldDescriptor::leaf("x", ColumnType::Real32),
        FieldDescriptor::collection("y", ColumnType::Real32),
    ])?;
    let mut writer = ContainerWriter::new(
        store,
        dir.clone(),
        name.as_str(),
        schema,
        WriterOptions {
            max_page_rows: convoy_config::CONFIG.max_page_rows,
        },
    )?;

    for i in 0..entries {
        let x = i as f32;
        writer.append_row(&[
            ("x", CellValue::F32(x)),
            (
                "y",
                CellValue::collection([CellValue::F32(x), CellValue::F32(2.0 * x)]),
            ),
        ])?;
        if cluster_size > 0 && (i + 1) % cluster_size == 0 {
            writer.commit_cluster()?;
        }
    }
    let descriptor = writer.finish().await?;

    println!("Wrote container: {}", dir);
    println!("Entries: {}", descriptor.entry_count);
    println!("Clusters: {}", descriptor.clusters.len());
    Ok(())
}
