// エラーハンドリング統合テスト
use crate::fixtures::{bounded_source, lanes_config};
use lane_pipeline::output::MockOutputer;
use lane_pipeline::{
    ConsoleProgressReporter, JsonLinesOutputer, MemoryOutputer, NoOpProgressReporter,
    PipelineError, ProcessingEngine, ProductSpec, TestProductsSource,
};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_duplicate_field_names_fail_schema_creation() {
    let source = TestProductsSource::builder(2)
        .product(ProductSpec::new("tracks.hits", "f32", 8))
        .product(ProductSpec::new("tracks.clusters", "f32", 8))
        .max_events(4)
        .build()
        .unwrap();
    let outputer = MemoryOutputer::new(2);
    let engine = ProcessingEngine::new(
        Arc::new(source),
        Arc::new(outputer.clone()),
        lanes_config(2),
        ConsoleProgressReporter::quiet(),
    );

    let error = engine.run().await.unwrap_err();

    assert!(matches!(error, PipelineError::SchemaCreation { .. }));
    assert!(error.to_string().contains("tracks.clusters"));
    assert!(outputer.records().is_empty());
}

#[tokio::test]
async fn test_unwritable_json_path_fails_setup() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("events.jsonl");
    let engine = ProcessingEngine::new(
        bounded_source(1, 2),
        Arc::new(JsonLinesOutputer::new(&path, 1)),
        lanes_config(1),
        NoOpProgressReporter::new(),
    );

    let error = engine.run().await.unwrap_err();
    assert!(matches!(error, PipelineError::Output { .. }));
}

#[tokio::test]
async fn test_zero_lanes_rejected() {
    let engine = ProcessingEngine::new(
        bounded_source(1, 2),
        Arc::new(MemoryOutputer::new(1)),
        lanes_config(0),
        NoOpProgressReporter::new(),
    );

    let error = engine.run().await.unwrap_err();
    assert!(matches!(error, PipelineError::Configuration { .. }));
}

#[tokio::test]
async fn test_setup_error_from_later_lane() {
    let mut mock_outputer = MockOutputer::new();
    mock_outputer
        .expect_setup_for_lane()
        .returning(|lane, _| match lane {
            0 => Ok(()),
            _ => Err(PipelineError::setup_order(lane)),
        });

    let engine = ProcessingEngine::new(
        bounded_source(2, 2),
        Arc::new(mock_outputer),
        lanes_config(2),
        NoOpProgressReporter::new(),
    );

    let error = engine.run().await.unwrap_err();
    assert!(matches!(error, PipelineError::SetupOrder { lane: 1 }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_seek_leaves_other_lanes_running() {
    let source = TestProductsSource::builder(4)
        .product(ProductSpec::new("a", "u8", 8))
        .max_events(200)
        .fail_seek_at(17)
        .fail_seek_at(90)
        .build()
        .unwrap();
    let outputer = MemoryOutputer::new(4);
    let engine = ProcessingEngine::new(
        Arc::new(source),
        Arc::new(outputer.clone()),
        lanes_config(4),
        NoOpProgressReporter::new(),
    );

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.events_processed, 198);
    let mut events = outputer.event_order();
    events.sort_unstable();
    let expected: Vec<u64> = (0..200).filter(|index| *index != 17 && *index != 90).collect();
    assert_eq!(events, expected);
}
