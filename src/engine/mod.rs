// エンジン層 - レーン群の構築と実行
// ソース・出力シンク・設定・進捗報告を組み合わせて一回の実行を管理する

pub mod processing_engine;

// 公開API - 主要エンジンクラス
pub use processing_engine::ProcessingEngine;
