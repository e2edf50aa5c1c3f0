// イベントソース層
//
// パイプラインのコアはこのトレイトを通してのみイベントソースに触れる。
// イベントの所在や終端の判定、プロダクトのバイト列の生成は実装側の責務。

pub mod retriever;
pub mod test_products;

use crate::core::{EventIdentifier, LaneIndex};
use crate::task::OptionalTaskHolder;

// 公開API
pub use retriever::{DataProductRetriever, ProductRetrieval, ProductStorage};
pub use test_products::{ProductSpec, TestProductsSource, TestProductsSourceBuilder};

/// 全レーンで共有されるイベントソース
pub trait SharedSource: Send + Sync {
    /// 対応しているレーン数
    fn num_lanes(&self) -> usize;

    /// レーンのスロット列（実行全体で順序と識別子が固定）
    fn data_products(&self, lane: LaneIndex) -> &[DataProductRetriever];

    /// レーンに現在バインドされているイベントの識別子
    fn event_identifier(&self, lane: LaneIndex) -> EventIdentifier;

    /// 安価な事前チェック。falseを返すと要求したレーンは終了する
    fn may_be_able_to_go_to_event(&self, index: u64) -> bool;

    /// レーンのスロットを `index` のイベントに非同期で位置付ける
    ///
    /// 成功時は `on_positioned.release_to_run()` を呼ぶ。位置付けに失敗した
    /// 場合はドロップするだけでよく、それは「これ以上の作業なし」を意味する。
    fn goto_event_async(&self, lane: LaneIndex, index: u64, on_positioned: OptionalTaskHolder);

    /// 実行終了時のサマリー出力
    fn print_summary(&self) {}
}
