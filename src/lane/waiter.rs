// Waiter - プロダクトごとの擬似処理コスト
// 下流の処理時間を模擬するため、サイズに比例した遅延を挟む

use crate::source::DataProductRetriever;
use crate::task::TaskHolder;
use std::time::Duration;

/// 1スロット分の遅延ステージ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waiter {
    data_product_index: usize,
    scale_factor: f64,
}

impl Waiter {
    /// `scale_factor` が負なら無効（遅延なし）
    pub fn new(data_product_index: usize, scale_factor: f64) -> Self {
        Self {
            data_product_index,
            scale_factor,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.scale_factor >= 0.0
    }

    pub fn data_product_index(&self) -> usize {
        self.data_product_index
    }

    /// サイズに対する遅延（`scale_factor × size` マイクロ秒）
    pub fn delay_for(&self, size: usize) -> Duration {
        if !self.is_enabled() {
            return Duration::ZERO;
        }
        Duration::from_nanos((self.scale_factor * size as f64 * 1000.0) as u64)
    }

    /// 遅延の後に `holder` を解放する
    ///
    /// 無効な場合は即座に解放する。遅延はタイマーで表現され、待機中に
    /// ワーカースレッドを占有しない。
    pub fn wait_async(&self, data_products: &[DataProductRetriever], holder: TaskHolder) {
        let size = data_products
            .get(self.data_product_index)
            .map_or(0, DataProductRetriever::size);
        let delay = self.delay_for(size);
        if delay.is_zero() {
            holder.release();
            return;
        }

        let group = holder.group().clone();
        group.run_after(delay, move || holder.release());
    }
}
