// メモリ内への書き出し（テスト・検証用）

use super::setup::{OutputSetup, Schema};
use super::timing::CollateTiming;
use super::{OutputSummary, Outputer};
use crate::core::{EventIdentifier, LaneIndex, PipelineError, PipelineResult};
use crate::source::DataProductRetriever;
use crate::task::{CollateFunnel, TaskHolder};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// collate済みの1イベント分のレコード
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    /// collate処理の実行順（イベント番号ではない）
    pub offset: u64,
    pub lane: LaneIndex,
    pub event: EventIdentifier,
    /// スロット順のプロダクトサイズ
    pub product_sizes: Vec<usize>,
    /// スロット順のプロダクトの中身
    pub products: Vec<Vec<u8>>,
    pub collate_started: Instant,
    pub collate_finished: Instant,
}

struct MemoryInner {
    setup: OutputSetup,
    funnel: Arc<CollateFunnel>,
    timing: CollateTiming,
    records: Mutex<Vec<OutputRecord>>,
    record_limit: Option<usize>,
    dropped_records: AtomicU64,
    product_ready_calls: AtomicU64,
    first_error: Mutex<Option<PipelineError>>,
}

impl MemoryInner {
    fn collate(&self, offset: u64, lane: LaneIndex, event: EventIdentifier) {
        let start = Instant::now();
        tracing::trace!(offset, lane, %event, "collating event");

        let Some(entry) = self.setup.entry(lane) else {
            self.record_error(PipelineError::setup_order(lane));
            return;
        };

        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if self.record_limit.is_some_and(|limit| records.len() >= limit) {
            // 上限に達した後はイベント数だけを数える
            self.dropped_records.fetch_add(1, Ordering::Relaxed);
        } else {
            let products: Vec<Vec<u8>> =
                entry.iter().map(|storage| storage.read().clone()).collect();
            let product_sizes = products.iter().map(Vec::len).collect();
            records.push(OutputRecord {
                offset,
                lane,
                event,
                product_sizes,
                products,
                collate_started: start,
                collate_finished: Instant::now(),
            });
        }
        drop(records);
        self.timing.record_collate(start);
    }

    fn record_error(&self, error: PipelineError) {
        tracing::error!(%error, "memory outputer failed to collate event");
        let mut slot = self.first_error.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(error);
        }
    }
}

/// `bounded` で保持するレコード数の既定値
pub const DEFAULT_RECORD_LIMIT: usize = 10_000;

/// collate結果をメモリに保持する出力シンク
///
/// `new` は全てのレコードを保持するので上限付きのソースで使う。上限のない
/// ソースでは `bounded` を使い、上限を超えた分はプロダクトを複製せず
/// 件数だけを `dropped_records` に数える。
#[derive(Clone)]
pub struct MemoryOutputer {
    inner: Arc<MemoryInner>,
    uses_product_ready: bool,
}

impl MemoryOutputer {
    pub fn new(num_lanes: usize) -> Self {
        Self::with_limit(num_lanes, None)
    }

    /// 保持するレコード数に上限を設ける
    pub fn bounded(num_lanes: usize, record_limit: usize) -> Self {
        Self::with_limit(num_lanes, Some(record_limit))
    }

    fn with_limit(num_lanes: usize, record_limit: Option<usize>) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                setup: OutputSetup::new(num_lanes),
                funnel: CollateFunnel::new(),
                timing: CollateTiming::default(),
                records: Mutex::new(Vec::new()),
                record_limit,
                dropped_records: AtomicU64::new(0),
                product_ready_calls: AtomicU64::new(0),
                first_error: Mutex::new(None),
            }),
            uses_product_ready: false,
        }
    }

    /// プロダクトごとの早期通知を受け取るようにする
    pub fn with_product_ready(mut self, enable: bool) -> Self {
        self.uses_product_ready = enable;
        self
    }

    /// テスト用：collate順のレコード
    pub fn records(&self) -> Vec<OutputRecord> {
        self.inner
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// テスト用：collate順のイベント番号
    pub fn event_order(&self) -> Vec<u64> {
        self.records().iter().map(|record| record.event.event).collect()
    }

    /// 上限のため保持されなかったレコードの数
    pub fn dropped_records(&self) -> u64 {
        self.inner.dropped_records.load(Ordering::Relaxed)
    }

    pub fn product_ready_calls(&self) -> u64 {
        self.inner.product_ready_calls.load(Ordering::Acquire)
    }

    pub fn schema(&self) -> Option<Schema> {
        self.inner.setup.schema().cloned()
    }
}

impl Outputer for MemoryOutputer {
    fn setup_for_lane(
        &self,
        lane: LaneIndex,
        data_products: &[DataProductRetriever],
    ) -> PipelineResult<()> {
        if let Some(schema) = self.inner.setup.setup_for_lane(lane, data_products)? {
            tracing::debug!(fields = ?schema.fields, "memory outputer schema created");
        }
        Ok(())
    }

    fn uses_product_ready_async(&self) -> bool {
        self.uses_product_ready
    }

    fn product_ready_async(
        &self,
        lane: LaneIndex,
        data_product: &DataProductRetriever,
        callback: TaskHolder,
    ) {
        tracing::trace!(lane, product = data_product.name(), "product ready");
        self.inner.product_ready_calls.fetch_add(1, Ordering::AcqRel);
        callback.release();
    }

    fn output_async(&self, lane: LaneIndex, event: EventIdentifier, callback: TaskHolder) {
        let start = Instant::now();
        let group = callback.group().clone();
        let inner = self.inner.clone();
        self.inner.funnel.push(&group, move |offset| {
            inner.collate(offset, lane, event);
            callback.release();
        });
        self.inner.timing.record_parallel(start);
    }

    fn print_summary(&self) {
        self.inner.timing.log_summary("MemoryOutputer");
    }

    fn finish(&self) -> PipelineResult<OutputSummary> {
        if let Some(error) = self
            .inner
            .first_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            return Err(error);
        }
        Ok(OutputSummary {
            events_written: self.inner.timing.events(),
            collate_time: self.inner.timing.collate_time(),
            parallel_time: self.inner.timing.parallel_time(),
        })
    }
}
