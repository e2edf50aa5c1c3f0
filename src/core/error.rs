// Custom error types for the lane pipeline
// パイプライン専用のカスタムエラー型定義

use thiserror::Error;

use super::types::LaneIndex;

/// パイプライン固有のエラー型
///
/// イベントソースの終端はエラーではないのでここには含まれない。
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("セットアップ順序エラー: レーン {lane} が未初期化の出力構造に到達しました")]
    SetupOrder { lane: LaneIndex },

    #[error("スキーマ作成エラー: {product} - {reason}")]
    SchemaCreation { product: String, reason: String },

    #[error("設定エラー: {message}")]
    Configuration { message: String },

    #[error("出力エラー: {source}")]
    Output {
        #[source]
        source: anyhow::Error,
    },

    #[error("ランタイムエラー: {source}")]
    Runtime {
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// セットアップ順序エラーの作成
    pub fn setup_order(lane: LaneIndex) -> Self {
        Self::SetupOrder { lane }
    }

    /// スキーマ作成エラーの作成
    pub fn schema_creation(product: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaCreation {
            product: product.into(),
            reason: reason.into(),
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 出力エラーの作成
    pub fn output(source: anyhow::Error) -> Self {
        Self::Output { source }
    }

    /// ランタイムエラーの作成
    pub fn runtime(source: std::io::Error) -> Self {
        Self::Runtime { source }
    }

    /// 実行を即座に中断すべきエラーかどうか
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SetupOrder { .. } | Self::SchemaCreation { .. } | Self::Runtime { .. }
        )
    }

    /// ログ出力用のカテゴリ名
    pub fn category(&self) -> &'static str {
        match self {
            Self::SetupOrder { .. } => "setup_order",
            Self::SchemaCreation { .. } => "schema_creation",
            Self::Configuration { .. } => "configuration",
            Self::Output { .. } => "output",
            Self::Runtime { .. } => "runtime",
        }
    }
}

/// パイプライン処理の結果型
pub type PipelineResult<T> = Result<T, PipelineError>;
