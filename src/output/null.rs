// 何も書き出さない出力シンク（スループットのベースライン）

use super::{OutputSummary, Outputer};
use crate::core::{EventIdentifier, LaneIndex, PipelineResult};
use crate::source::DataProductRetriever;
use crate::task::TaskHolder;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct NullOutputer {
    uses_product_ready: bool,
    events: AtomicU64,
    products_ready: AtomicU64,
}

impl NullOutputer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product_ready(mut self, enable: bool) -> Self {
        self.uses_product_ready = enable;
        self
    }

    pub fn events(&self) -> u64 {
        self.events.load(Ordering::Acquire)
    }

    pub fn products_ready(&self) -> u64 {
        self.products_ready.load(Ordering::Acquire)
    }
}

impl Outputer for NullOutputer {
    fn setup_for_lane(
        &self,
        _lane: LaneIndex,
        _data_products: &[DataProductRetriever],
    ) -> PipelineResult<()> {
        Ok(())
    }

    fn uses_product_ready_async(&self) -> bool {
        self.uses_product_ready
    }

    fn product_ready_async(
        &self,
        _lane: LaneIndex,
        _data_product: &DataProductRetriever,
        callback: TaskHolder,
    ) {
        self.products_ready.fetch_add(1, Ordering::AcqRel);
        callback.release();
    }

    fn output_async(&self, _lane: LaneIndex, _event: EventIdentifier, callback: TaskHolder) {
        self.events.fetch_add(1, Ordering::AcqRel);
        callback.release();
    }

    fn print_summary(&self) {
        tracing::info!(
            events = self.events(),
            products_ready = self.products_ready(),
            "NullOutputer finished"
        );
    }

    fn finish(&self) -> PipelineResult<OutputSummary> {
        Ok(OutputSummary {
            events_written: self.events(),
            ..OutputSummary::default()
        })
    }
}
