use std::sync::Arc;

use convoy_format::column::ColumnType;
use convoy_format::container::{ContainerWriter, WriterOptions};
use convoy_format::descriptor::{FieldDescriptor, Schema};
use convoy_format::value::CellValue;
use convoy_processor::error::ProcessorError;
use convoy_processor::processor::ChainProcessor;
use convoy_sources::container_format::ContainerFormat;
use convoy_sources::spec::SourceSpec;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::ObjectStore;

fn event_schema() -> Schema {
    Schema::from_fields([
        FieldDescriptor::leaf("x", ColumnType::Real32),
        FieldDescriptor::collection("y", ColumnType::Real32),
    ])
    .expect("schema")
}

fn narrow_schema() -> Schema {
    Schema::from_fields([FieldDescriptor::leaf("x", ColumnType::Real32)]).expect("schema")
}

/// Writes a container whose rows hold x = f32(first + i) and, when the
/// schema has it, y = [x, 2x].
async fn write_container(
    store: Arc<dyn ObjectStore>,
    dir: &str,
    name: &str,
    schema: Schema,
    first: u64,
    rows: u64,
) {
    let wide = schema.contains("y");
    let mut writer = ContainerWriter::new(
        store,
        Path::from(dir),
        name,
        schema,
        WriterOptions { max_page_rows: 2 },
    )
    .expect("writer");
    for i in first..first + rows {
        let x = i as f32;
        if wide {
            writer
                .append_row(&[
                    ("x", CellValue::F32(x)),
                    (
                        "y",
                        CellValue::collection([CellValue::F32(x), CellValue::F32(2.0 * x)]),
                    ),
                ])
                .expect("append");
        } else {
            writer
                .append_row(&[("x", CellValue::F32(x))])
                .expect("append");
        }
    }
    writer.finish().await.expect("finish");
}

#[tokio::test]
async fn a_chain_of_containers_reads_as_one_sequence() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());

    // 1) Write two containers carrying a continuous run of entries.
    write_container(store.clone(), "a.ntc", "a", event_schema(), 0, 5).await;
    write_container(store.clone(), "b.ntc", "b", event_schema(), 5, 3).await;

    // 2) Chain them through the container opener.
    let opener = Arc::new(ContainerFormat::new(store));
    let specs = vec![SourceSpec::new("a", "a.ntc"), SourceSpec::new("b", "b.ntc")];
    let mut processor = ChainProcessor::new(opener, specs)
        .await
        .expect("processor");
    assert_eq!(processor.source_count(), 2);

    // 3) The chain reads as one sequence with a continuous global index.
    let mut locals = Vec::new();
    while let Some(entry) = processor.next_entry().await.expect("advance") {
        let x: f32 = entry.value("x").await.expect("x");
        let y: Vec<f32> = entry.value("y").await.expect("y");
        assert_eq!(x, entry.global_index() as f32);
        assert_eq!(y, vec![x, 2.0 * x]);
        locals.push(entry.local_index());
    }
    assert_eq!(locals, vec![0, 1, 2, 3, 4, 0, 1, 2]);
    assert_eq!(processor.entries_processed(), 8);
}

#[tokio::test]
async fn empty_containers_anchor_nothing_but_are_skipped_mid_chain() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());

    // Containers sized 0, 2, 0, 3, 0.
    write_container(store.clone(), "c0.ntc", "c0", event_schema(), 0, 0).await;
    write_container(store.clone(), "c1.ntc", "c1", event_schema(), 0, 2).await;
    write_container(store.clone(), "c2.ntc", "c2", event_schema(), 0, 0).await;
    write_container(store.clone(), "c3.ntc", "c3", event_schema(), 2, 3).await;
    write_container(store.clone(), "c4.ntc", "c4", event_schema(), 0, 0).await;

    let opener = Arc::new(ContainerFormat::new(store));
    let all: Vec<_> = (0..5)
        .map(|i| SourceSpec::new(format!("c{i}"), format!("c{i}.ntc")))
        .collect();

    // 1) Anchoring the chain on the empty container is refused.
    let err = ChainProcessor::new(opener.clone(), all.clone())
        .await
        .expect_err("empty anchor");
    assert!(matches!(err, ProcessorError::Configuration(_)));
    assert!(err
        .to_string()
        .contains("first source does not contain any entries"));

    // 2) Starting at the first non-empty container yields every entry,
    //    silently skipping the interior and trailing empty ones.
    let mut processor = ChainProcessor::new(opener, all[1..].to_vec())
        .await
        .expect("processor");
    let mut count = 0u64;
    while let Some(entry) = processor.next_entry().await.expect("advance") {
        assert_eq!(entry.global_index(), count);
        count += 1;
    }
    assert_eq!(count, 5);
    assert!(processor.next_entry().await.expect("end").is_none());
}

#[tokio::test]
async fn narrower_schemas_fail_only_when_the_field_is_accessed() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    write_container(store.clone(), "wide.ntc", "wide", event_schema(), 0, 2).await;
    write_container(store.clone(), "narrow.ntc", "narrow", narrow_schema(), 2, 2).await;

    let opener = Arc::new(ContainerFormat::new(store));
    let specs = vec![
        SourceSpec::new("wide", "wide.ntc"),
        SourceSpec::new("narrow", "narrow.ntc"),
    ];
    let mut processor = ChainProcessor::new(opener, specs)
        .await
        .expect("processor");

    let mut yielded = 0u64;
    while let Some(entry) = processor.next_entry().await.expect("advance") {
        // x resolves in both containers.
        let x: f32 = entry.value("x").await.expect("x");
        assert_eq!(x, entry.global_index() as f32);

        // y resolves only while the wide container is active.
        let y = entry.value::<Vec<f32>>("y").await;
        if entry.global_index() < 2 {
            assert_eq!(y.expect("y"), vec![x, 2.0 * x]);
        } else {
            let err = y.expect_err("y is gone");
            assert_eq!(err.to_string(), "field \"y\" not found in current source");
        }
        yielded += 1;
    }
    assert_eq!(yielded, 4);
}

#[tokio::test]
async fn chains_read_containers_from_local_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store: Arc<dyn ObjectStore> = Arc::new(
        object_store::local::LocalFileSystem::new_with_prefix(dir.path()).expect("local store"),
    );

    write_container(store.clone(), "disk.ntc", "disk", event_schema(), 0, 4).await;

    let opener = Arc::new(ContainerFormat::new(store));
    let mut processor = ChainProcessor::new(opener, vec![SourceSpec::new("disk", "disk.ntc")])
        .await
        .expect("processor");

    let mut count = 0u64;
    while let Some(entry) = processor.next_entry().await.expect("advance") {
        let x: f32 = entry.value("x").await.expect("x");
        assert_eq!(x, count as f32);
        count += 1;
    }
    assert_eq!(count, 4);
}
