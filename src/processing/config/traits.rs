// 設定管理のトレイト定義

use crate::core::{PipelineError, PipelineResult};

/// パイプラインの設定を抽象化するトレイト
pub trait PipelineConfig: Send + Sync {
    /// レーン数を取得
    fn num_lanes(&self) -> usize;

    /// ワーカースレッド数を取得
    fn num_threads(&self) -> usize;

    /// 処理するイベント数の上限（Noneなら無制限）
    fn max_events(&self) -> Option<u64>;

    /// Waiterのスケールファクター（負なら無効）
    fn scale_factor(&self) -> f64;

    /// ログの詳細度（0: info, 1: debug, 2以上: trace）
    fn verbosity(&self) -> u8;

    /// 設定値の検証
    fn validate(&self) -> PipelineResult<()> {
        if self.num_lanes() == 0 {
            return Err(PipelineError::configuration("レーン数は1以上が必要です"));
        }
        if self.num_threads() == 0 {
            return Err(PipelineError::configuration("スレッド数は1以上が必要です"));
        }
        if self.scale_factor().is_nan() {
            return Err(PipelineError::configuration("スケールファクターが数値ではありません"));
        }
        Ok(())
    }
}
