use std::sync::Arc;

use convoy_processor::processor::ChainProcessor;
use convoy_sources::container_format::ContainerFormat;
use convoy_sources::spec::SourceSpec;
use object_store::ObjectStore;

/// Chains every container matched by `pattern` (relative to the
/// containers dir, in path order) and walks the combined entry sequence.
pub async fn chain(pattern: String, field: Option<String>) -> anyhow::Result<()> {
    let specs = resolve_specs(&pattern)?;
    anyhow::ensure!(!specs.is_empty(), "no containers match {pattern}");
    for spec in &specs {
        println!("Chaining container: {spec}");
    }

    let store: Arc<dyn ObjectStore> = convoy_config::OBJECT_STORE_LOCAL_FS.clone();
    let opener = Arc::new(ContainerFormat::new(store));
    let mut processor = ChainProcessor::new(opener, specs).await?;

    let mut total = 0u64;
    while let Some(entry) = processor.next_entry().await? {
        let mut cells = Vec::new();
        match &field {
            Some(field) => cells.push(format!("{field}={:?}", entry.cell(field).await?)),
            None => {
                for name in entry.schema().field_names() {
                    cells.push(format!("{name}={:?}", entry.cell(name).await?));
                }
            }
        }
        println!(
            "[{} | {}:{}] {}",
            entry.global_index(),
            entry.source_name(),
            entry.local_index(),
            cells.join(" ")
        );
        total += 1;
    }
    println!("Chained entries: {}", total);
    Ok(())
}

/// One spec per matched container directory; the source name is the
/// directory stem, the convention `create` writes under.
fn resolve_specs(pattern: &str) -> anyhow::Result<Vec<SourceSpec>> {
    let full_pattern = convoy_config::CONTAINERS_DIR_PATH.join(pattern);
    let mut paths: Vec<std::path::PathBuf> = Vec::new();
    for entry in glob::glob(&full_pattern.to_string_lossy())? {
        paths.push(entry?);
    }
    paths.sort();

    let mut specs = Vec::new();
    for path in paths {
        let relative = path.strip_prefix(convoy_config::DATA_DIR.as_path())?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| anyhow::anyhow!("container path {} has no name", path.display()))?;
        specs.push(SourceSpec::new(
            name,
            object_store::path::Path::from(relative.to_string_lossy().as_ref()),
        ));
    }
    Ok(specs)
}
