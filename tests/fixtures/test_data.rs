// テスト用のソース組み立てヘルパー

use lane_pipeline::{DefaultPipelineConfig, ProductSpec, SharedSource, TestProductsSource};
use std::sync::Arc;

/// 補助情報なしの2プロダクト構成
pub fn standard_products() -> Vec<ProductSpec> {
    vec![
        ProductSpec::new("tracks.hits", "f32", 64),
        ProductSpec::new("calo", "u16", 128),
    ]
}

/// 上限付きの合成ソース
pub fn bounded_source(lanes: usize, events: u64) -> Arc<dyn SharedSource> {
    Arc::new(
        TestProductsSource::builder(lanes)
            .products(standard_products())
            .max_events(events)
            .build()
            .unwrap(),
    )
}

pub fn lanes_config(lanes: usize) -> DefaultPipelineConfig {
    DefaultPipelineConfig::new().with_lanes(lanes).with_threads(4)
}
