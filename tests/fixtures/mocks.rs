// 検証用の出力シンク

use lane_pipeline::output::OutputSummary;
use lane_pipeline::{
    CollateFunnel, DataProductRetriever, EventIdentifier, LaneIndex, Outputer, PipelineResult,
    TaskHolder,
};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// collate処理の同時実行数を記録する出力シンク
#[derive(Default)]
pub struct ConcurrencyTrackingOutputer {
    funnel: Arc<CollateFunnel>,
    tracker: Arc<CollateTracker>,
}

#[derive(Default)]
pub struct CollateTracker {
    active: AtomicUsize,
    max_active: AtomicUsize,
    collated: AtomicU64,
    offsets: Mutex<Vec<u64>>,
}

impl ConcurrencyTrackingOutputer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_active(&self) -> usize {
        self.tracker.max_active.load(Ordering::SeqCst)
    }

    pub fn collated(&self) -> u64 {
        self.tracker.collated.load(Ordering::SeqCst)
    }

    pub fn offsets(&self) -> Vec<u64> {
        self.tracker.offsets.lock().unwrap().clone()
    }
}

impl Outputer for ConcurrencyTrackingOutputer {
    fn setup_for_lane(
        &self,
        _lane: LaneIndex,
        _data_products: &[DataProductRetriever],
    ) -> PipelineResult<()> {
        Ok(())
    }

    fn uses_product_ready_async(&self) -> bool {
        false
    }

    fn product_ready_async(
        &self,
        _lane: LaneIndex,
        _data_product: &DataProductRetriever,
        callback: TaskHolder,
    ) {
        callback.release();
    }

    fn output_async(&self, _lane: LaneIndex, _event: EventIdentifier, callback: TaskHolder) {
        let tracker = self.tracker.clone();
        let group = callback.group().clone();
        self.funnel.push(&group, move |offset| {
            let active = tracker.active.fetch_add(1, Ordering::SeqCst) + 1;
            tracker.max_active.fetch_max(active, Ordering::SeqCst);
            // 他のcollateが割り込む余地を作る
            for _ in 0..100 {
                std::hint::spin_loop();
            }
            tracker.offsets.lock().unwrap().push(offset);
            tracker.collated.fetch_add(1, Ordering::SeqCst);
            tracker.active.fetch_sub(1, Ordering::SeqCst);
            callback.release();
        });
    }

    fn print_summary(&self) {}

    fn finish(&self) -> PipelineResult<OutputSummary> {
        Ok(OutputSummary {
            events_written: self.collated(),
            ..OutputSummary::default()
        })
    }
}
