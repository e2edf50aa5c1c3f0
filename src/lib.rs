//! レーン並列のイベント処理コア
//!
//! 固定数のレーンが共有ソースから次のイベント番号を奪い合い、イベントごとに
//! データプロダクトを非同期に取得し、完了したイベントを単一書き込みの出力
//! ステージへ流し込む。ワーカースレッドをI/Oや他のレーンでブロックしない。
//!
//! - [`task`]: 完了トークン（[`TaskHolder`]）と直列化キュー（[`CollateFunnel`]）
//! - [`lane`]: イベント番号カウンタ、Waiter、レーンの処理ループ
//! - [`source`]: イベントソースのトレイトと合成ソース
//! - [`output`]: 出力シンクのトレイトと実装
//! - [`engine`]: 実行全体のオーケストレーション

pub mod cli;
pub mod core;
pub mod engine;
pub mod lane;
pub mod output;
pub mod processing;
pub mod source;
pub mod task;

pub use crate::core::{EventIdentifier, LaneIndex, PipelineError, PipelineResult, ProcessingSummary};
pub use engine::ProcessingEngine;
pub use lane::{EventCounter, Lane, LaneContext, Waiter};
pub use output::{JsonLinesOutputer, MemoryOutputer, NullOutputer, Outputer};
pub use processing::{
    ConsoleProgressReporter, DefaultPipelineConfig, NoOpProgressReporter, PipelineConfig,
    ProgressReporter,
};
pub use source::{DataProductRetriever, ProductSpec, SharedSource, TestProductsSource};
pub use task::{CollateFunnel, OptionalTaskHolder, TaskGroup, TaskHolder};
