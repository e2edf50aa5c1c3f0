// 出力シンク層
//
// setup       - レーン0による一度きりのスキーマ作成とレーンごとのバインド
// timing      - collate時間と並列時間の集計
// memory      - メモリ内への書き出し（テスト・検証用）
// json_lines  - JSON Lines ファイルへの書き出し
// null        - 何も書き出さないベースライン

pub mod json_lines;
pub mod memory;
pub mod null;
pub mod setup;
pub mod timing;

use crate::core::{EventIdentifier, LaneIndex, PipelineResult};
use crate::source::DataProductRetriever;
use crate::task::TaskHolder;
use mockall::automock;
use std::time::Duration;

// 公開API
pub use json_lines::JsonLinesOutputer;
pub use memory::{MemoryOutputer, OutputRecord, DEFAULT_RECORD_LIMIT};
pub use null::NullOutputer;
pub use setup::{OutputSetup, Schema, EVENT_AUXILIARY, EVENT_ID_FIELD};
pub use timing::CollateTiming;

/// 出力シンクの集計結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSummary {
    pub events_written: u64,
    /// collate処理（直列部分）の合計時間
    pub collate_time: Duration,
    /// `output_async` 内の直列化されない部分の合計時間
    pub parallel_time: Duration,
}

/// 完了したイベントを受け取る出力シンク
#[automock]
pub trait Outputer: Send + Sync {
    /// レーンごとに一度呼ばれる。レーン0の呼び出しがグローバルなセットアップを
    /// 行い、他のレーンは自分のストレージをバインドするだけ。
    fn setup_for_lane(
        &self,
        lane: LaneIndex,
        data_products: &[DataProductRetriever],
    ) -> PipelineResult<()>;

    /// プロダクトごとの早期通知を使うかどうか
    fn uses_product_ready_async(&self) -> bool;

    /// プロダクトの準備完了通知。`callback` を解放すること
    fn product_ready_async(
        &self,
        lane: LaneIndex,
        data_product: &DataProductRetriever,
        callback: TaskHolder,
    );

    /// イベントの書き出し。記録が完了した後に `callback` を解放すること
    fn output_async(&self, lane: LaneIndex, event: EventIdentifier, callback: TaskHolder);

    fn print_summary(&self);

    /// 書き出しを完了させ、途中で記録されたエラーがあれば返す
    fn finish(&self) -> PipelineResult<OutputSummary>;
}
