// パイプライン全体で共有するデータ構造

use serde::{Deserialize, Serialize};
use std::fmt;

/// レーン番号 (`0..N`)
pub type LaneIndex = usize;

/// レーンに現在バインドされているイベントの識別子
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventIdentifier {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
}

impl EventIdentifier {
    pub fn new(run: u32, lumi: u32, event: u64) -> Self {
        Self { run, lumi, event }
    }
}

impl fmt::Display for EventIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.run, self.lumi, self.event)
    }
}

/// 実行結果のサマリー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub num_lanes: usize,
    pub events_processed: u64,
    /// レーンごとの処理済みイベント数（レーン番号順）
    pub events_per_lane: Vec<u64>,
    pub total_processing_time_ms: u64,
    pub events_per_second: f64,
}

impl ProcessingSummary {
    pub fn new(events_per_lane: Vec<u64>, total_processing_time_ms: u64) -> Self {
        let events_processed = events_per_lane.iter().sum();
        let events_per_second = if total_processing_time_ms > 0 {
            events_processed as f64 * 1000.0 / total_processing_time_ms as f64
        } else {
            0.0
        };

        Self {
            num_lanes: events_per_lane.len(),
            events_processed,
            events_per_lane,
            total_processing_time_ms,
            events_per_second,
        }
    }
}
