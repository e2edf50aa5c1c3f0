// 設定と進捗報告の基本実装

use super::{PipelineConfig, ProgressReporter};
use crate::core::{PipelineError, ProcessingSummary};
use async_trait::async_trait;

/// デフォルト設定実装
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultPipelineConfig {
    lanes: usize,
    threads: usize,
    max_events: Option<u64>,
    scale_factor: f64,
    verbosity: u8,
}

impl DefaultPipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lanes(mut self, lanes: usize) -> Self {
        self.lanes = lanes;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_max_events(mut self, max_events: Option<u64>) -> Self {
        self.max_events = max_events;
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }
}

impl Default for DefaultPipelineConfig {
    fn default() -> Self {
        let cpus = num_cpus::get().max(1);
        Self {
            lanes: cpus,
            threads: cpus,
            max_events: None,
            scale_factor: -1.0,
            verbosity: 0,
        }
    }
}

impl PipelineConfig for DefaultPipelineConfig {
    fn num_lanes(&self) -> usize {
        self.lanes
    }

    fn num_threads(&self) -> usize {
        self.threads
    }

    fn max_events(&self) -> Option<u64> {
        self.max_events
    }

    fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    fn verbosity(&self) -> u8 {
        self.verbosity
    }
}

/// コンソール出力による進捗報告実装
#[derive(Debug, Default, Clone)]
pub struct ConsoleProgressReporter {
    quiet: bool,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    /// 実行を中断させたエラーかどうかで表示を変える
    pub fn format_error(error: &PipelineError) -> String {
        if error.is_fatal() {
            format!("❌ Fatal error ({}): {error}", error.category())
        } else {
            format!("⚠️  Error ({}): {error}", error.category())
        }
    }
}

#[async_trait]
impl ProgressReporter for ConsoleProgressReporter {
    async fn report_started(&self, num_lanes: usize, max_events: Option<u64>) {
        if !self.quiet {
            match max_events {
                Some(max) => println!("🚀 Starting {num_lanes} lanes for {max} events..."),
                None => println!("🚀 Starting {num_lanes} lanes until the source is exhausted..."),
            }
        }
    }

    async fn report_error(&self, error: &PipelineError) {
        if !self.quiet {
            eprintln!("{}", Self::format_error(error));
        }
    }

    async fn report_completed(&self, summary: &ProcessingSummary) {
        if !self.quiet {
            println!(
                "✅ Completed! Events: {}, Lanes: {}, Time: {}ms ({:.1} events/s)",
                summary.events_processed,
                summary.num_lanes,
                summary.total_processing_time_ms,
                summary.events_per_second
            );
            for (lane, events) in summary.events_per_lane.iter().enumerate() {
                println!("   - lane {lane}: {events} events");
            }
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_started(&self, _num_lanes: usize, _max_events: Option<u64>) {
        // 何もしない
    }

    async fn report_error(&self, _error: &PipelineError) {
        // 何もしない
    }

    async fn report_completed(&self, _summary: &ProcessingSummary) {
        // 何もしない
    }
}
