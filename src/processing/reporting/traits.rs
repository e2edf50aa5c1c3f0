// 進捗報告のトレイト定義

use crate::core::{PipelineError, ProcessingSummary};

/// 進捗報告を抽象化するトレイト
#[async_trait::async_trait]
pub trait ProgressReporter: Send + Sync {
    /// 処理開始時の報告
    async fn report_started(&self, num_lanes: usize, max_events: Option<u64>);

    /// エラー発生時の報告
    async fn report_error(&self, error: &PipelineError);

    /// 処理完了時の報告
    async fn report_completed(&self, summary: &ProcessingSummary);
}
