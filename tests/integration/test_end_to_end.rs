// エンドツーエンド統合テスト
use crate::fixtures::{bounded_source, lanes_config, standard_products, ConcurrencyTrackingOutputer};
use lane_pipeline::output::EVENT_ID_FIELD;
use lane_pipeline::{
    JsonLinesOutputer, MemoryOutputer, NoOpProgressReporter, ProcessingEngine, ProductSpec,
    TestProductsSource,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_lanes_six_events() {
    let outputer = MemoryOutputer::new(2);
    let engine = ProcessingEngine::new(
        bounded_source(2, 6),
        Arc::new(outputer.clone()),
        lanes_config(2),
        NoOpProgressReporter::new(),
    );

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.events_processed, 6);
    assert_eq!(summary.events_per_lane.len(), 2);

    let records = outputer.records();
    let events: HashSet<u64> = records.iter().map(|record| record.event.event).collect();
    assert_eq!(events, (0..6).collect());

    // オフセットは0から連番
    let mut offsets: Vec<u64> = records.iter().map(|record| record.offset).collect();
    offsets.sort_unstable();
    assert_eq!(offsets, (0..6).collect::<Vec<_>>());

    // collate区間は重ならない
    let mut intervals: Vec<_> = records
        .iter()
        .map(|record| (record.collate_started, record.collate_finished))
        .collect();
    intervals.sort();
    for pair in intervals.windows(2) {
        assert!(pair[0].1 <= pair[1].0);
    }

    // 各イベントのプロダクトは自分のイベントの中身
    for record in &records {
        assert_eq!(record.product_sizes, vec![64, 128]);
        assert_eq!(record.products[0][0], record.event.event as u8);
        assert_eq!(record.products[1][0], (record.event.event + 1) as u8);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_collate_never_runs_concurrently() {
    let outputer = Arc::new(ConcurrencyTrackingOutputer::new());
    let engine = ProcessingEngine::new(
        bounded_source(8, 500),
        outputer.clone(),
        lanes_config(8),
        NoOpProgressReporter::new(),
    );

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.events_processed, 500);
    assert_eq!(outputer.collated(), 500);
    assert_eq!(outputer.max_active(), 1);
    assert_eq!(outputer.offsets(), (0..500).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_index_claimed_exactly_once() {
    let outputer = MemoryOutputer::new(6);
    let engine = ProcessingEngine::new(
        bounded_source(6, 1000),
        Arc::new(outputer.clone()),
        lanes_config(6),
        NoOpProgressReporter::new(),
    );

    let summary = engine.run().await.unwrap();

    let events = outputer.event_order();
    let unique: HashSet<u64> = events.iter().copied().collect();
    assert_eq!(events.len(), 1000);
    assert_eq!(unique.len(), 1000);
    assert_eq!(summary.events_per_lane.iter().sum::<u64>(), 1000);
}

#[tokio::test(start_paused = true)]
async fn test_waiters_add_delay_per_product() {
    let source = TestProductsSource::builder(1)
        .product(ProductSpec::new("a", "u8", 500))
        .product(ProductSpec::new("b", "u8", 1000))
        .max_events(4)
        .build()
        .unwrap();
    let engine = ProcessingEngine::new(
        Arc::new(source),
        Arc::new(MemoryOutputer::new(1)),
        lanes_config(1).with_scale_factor(2.0),
        NoOpProgressReporter::new(),
    );
    let start = tokio::time::Instant::now();

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.events_processed, 4);
    // スロットは並行に待つので1イベントあたり最長の 2 × 1000 マイクロ秒
    assert!(start.elapsed() >= Duration::from_millis(8));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_lines_output() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("events.jsonl");
    let engine = ProcessingEngine::new(
        bounded_source(2, 10),
        Arc::new(JsonLinesOutputer::new(&path, 2)),
        lanes_config(2),
        NoOpProgressReporter::new(),
    );

    engine.run().await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 11);

    let header = &lines[0];
    assert_eq!(header["lanes"], 2);
    let fields: Vec<&str> = header["schema"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|field| field.as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["tracks", "calo", EVENT_ID_FIELD]);
    assert!(header["created"].is_string());

    let mut events: Vec<u64> = lines[1..]
        .iter()
        .map(|line| line["event"].as_u64().unwrap())
        .collect();
    events.sort_unstable();
    assert_eq!(events, (0..10).collect::<Vec<_>>());
    for line in &lines[1..] {
        assert_eq!(line["run"], 1);
        assert_eq!(line["products"].as_array().unwrap().len(), standard_products().len());
    }
}

#[tokio::test]
async fn test_event_auxiliary_suppresses_event_id_field() {
    let source = TestProductsSource::builder(1)
        .product(ProductSpec::new("EventAuxiliary", "aux", 16))
        .product(ProductSpec::new("calo", "u16", 8))
        .max_events(2)
        .build()
        .unwrap();
    let outputer = MemoryOutputer::new(1);
    let engine = ProcessingEngine::new(
        Arc::new(source),
        Arc::new(outputer.clone()),
        lanes_config(1),
        NoOpProgressReporter::new(),
    );

    engine.run().await.unwrap();

    let schema = outputer.schema().unwrap();
    assert_eq!(schema.fields, vec!["EventAuxiliary", "calo"]);
    assert!(!schema.has_event_id);
}
