// 実行設定と進捗報告
// 機能別フォルダ構造によるアーキテクチャ

// 機能モジュール
pub mod config;          // 設定管理
pub mod implementations; // 基本実装
pub mod reporting;       // 進捗報告

// 公開API - 各機能から再エクスポート
pub use config::PipelineConfig;
pub use implementations::{ConsoleProgressReporter, DefaultPipelineConfig, NoOpProgressReporter};
pub use reporting::ProgressReporter;
