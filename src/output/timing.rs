// collate時間の集計

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 出力シンクの時間集計
///
/// collate時間は直列実行部分、並列時間は `output_async` の中で
/// 直列化されずに費やされた時間。
#[derive(Debug, Default)]
pub struct CollateTiming {
    collate_ns: AtomicU64,
    parallel_ns: AtomicU64,
    events: AtomicU64,
}

impl CollateTiming {
    pub fn record_collate(&self, start: Instant) {
        self.collate_ns
            .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
        self.events.fetch_add(1, Ordering::Relaxed);
    }

    /// 書き出しに失敗したcollate。時間は集計するがイベント数には含めない
    pub fn record_failed_collate(&self, start: Instant) {
        self.collate_ns
            .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn record_parallel(&self, start: Instant) {
        self.parallel_ns
            .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn collate_time(&self) -> Duration {
        Duration::from_nanos(self.collate_ns.load(Ordering::Relaxed))
    }

    pub fn parallel_time(&self) -> Duration {
        Duration::from_nanos(self.parallel_ns.load(Ordering::Relaxed))
    }

    pub fn events(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }

    pub fn log_summary(&self, outputer: &str) {
        tracing::info!(
            outputer,
            events = self.events(),
            collate_us = self.collate_time().as_micros() as u64,
            parallel_us = self.parallel_time().as_micros() as u64,
            "total serial collate time and non-serializer parallel time"
        );
    }
}
