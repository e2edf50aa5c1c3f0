// Lane - 自己供給型のイベント処理ループ
//
// 番号の取得 → シーク → fan-out/join → 出力 → 次の番号の取得、を
// 継続渡しで繰り返す。再帰は毎回新しいタスクとして投入されるので
// スタックは伸びない。

use super::counter::EventCounter;
use super::waiter::Waiter;
use crate::core::LaneIndex;
use crate::output::Outputer;
use crate::source::{DataProductRetriever, SharedSource};
use crate::task::{OptionalTaskHolder, TaskGroup, TaskHolder};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// レーンのループが共有するハンドル
#[derive(Clone)]
pub struct LaneContext {
    pub counter: Arc<EventCounter>,
    pub group: TaskGroup,
    pub outputer: Arc<dyn Outputer>,
    /// trueならイベントごとのdebugログを出す
    pub verbose: bool,
}

impl LaneContext {
    pub fn new(counter: Arc<EventCounter>, group: TaskGroup, outputer: Arc<dyn Outputer>) -> Self {
        Self {
            counter,
            group,
            outputer,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// 1本の逐次処理ストリーム
///
/// イベント単位の状態は持たない。イベントごとの中身はソースが持つ
/// 再利用スロットにある。
pub struct Lane {
    index: LaneIndex,
    source: Arc<dyn SharedSource>,
    waiters: Vec<Waiter>,
    events_processed: AtomicU64,
}

impl Lane {
    /// `scale_factor` が負ならWaiterを作らない
    pub fn new(index: LaneIndex, source: Arc<dyn SharedSource>, scale_factor: f64) -> Self {
        let waiters = if scale_factor >= 0.0 {
            (0..source.data_products(index).len())
                .map(|slot| Waiter::new(slot, scale_factor))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            index,
            source,
            waiters,
            events_processed: AtomicU64::new(0),
        }
    }

    pub fn index(&self) -> LaneIndex {
        self.index
    }

    pub fn data_products(&self) -> &[DataProductRetriever] {
        self.source.data_products(self.index)
    }

    pub fn waiters(&self) -> &[Waiter] {
        &self.waiters
    }

    /// 出力まで完了したイベントの数
    pub fn events_processed(&self) -> u64 {
        self.events_processed.load(Ordering::Acquire)
    }

    /// ソースが尽きるまでイベントを処理し続ける
    pub fn process_events_async(self: &Arc<Self>, ctx: LaneContext) {
        self.do_next_event(ctx);
    }

    fn do_next_event(self: &Arc<Self>, ctx: LaneContext) {
        let index = ctx.counter.claim();
        if !self.source.may_be_able_to_go_to_event(index) {
            tracing::debug!(
                lane = self.index,
                index,
                processed = self.events_processed(),
                "no more events, lane finished"
            );
            return;
        }
        if ctx.verbose {
            tracing::debug!(lane = self.index, event = index, "claimed event");
        }

        let lane = self.clone();
        let group = ctx.group.clone();
        let process_event = OptionalTaskHolder::new(&group, move || {
            let recursive_lane = lane.clone();
            let recursive_ctx = ctx.clone();
            let recursive = TaskHolder::new(&ctx.group, move || {
                recursive_lane
                    .events_processed
                    .fetch_add(1, Ordering::AcqRel);
                recursive_lane.do_next_event(recursive_ctx);
            });
            lane.process_event_async(&ctx.group, recursive, &ctx.outputer);
        });
        self.source
            .goto_event_async(self.index, index, process_event);
    }

    /// 現在位置付けられているイベントを処理する
    ///
    /// 全スロットの取得（とWaiter・早期通知）が終わると `output_async` が呼ばれ、
    /// 出力の完了で `callback` が解放される。
    pub fn process_event_async(
        self: &Arc<Self>,
        group: &TaskGroup,
        callback: TaskHolder,
        outputer: &Arc<dyn Outputer>,
    ) {
        let lane = self.clone();
        let output = outputer.clone();
        let holder = TaskHolder::new(group, move || {
            let event = lane.source.event_identifier(lane.index);
            output.output_async(lane.index, event, callback);
        });

        // スロット順は出力側の位置対応に使われる
        for (slot, product) in self.data_products().iter().enumerate() {
            product.get_async(self.make_task_for_data_product(group, slot, outputer, holder.clone()));
        }
        holder.release();
    }

    fn make_task_for_data_product(
        self: &Arc<Self>,
        group: &TaskGroup,
        slot: usize,
        outputer: &Arc<dyn Outputer>,
        holder: TaskHolder,
    ) -> TaskHolder {
        if !outputer.uses_product_ready_async() {
            return self.make_waiter_task(group, slot, holder);
        }

        let lane = self.clone();
        let output = outputer.clone();
        let product_ready = TaskHolder::new(group, move || {
            let product = &lane.data_products()[slot];
            output.product_ready_async(lane.index, product, holder);
        });
        self.make_waiter_task(group, slot, product_ready)
    }

    fn make_waiter_task(self: &Arc<Self>, group: &TaskGroup, slot: usize, holder: TaskHolder) -> TaskHolder {
        if self.waiters.is_empty() {
            return holder;
        }
        let lane = self.clone();
        TaskHolder::new(group, move || {
            lane.waiters[slot].wait_async(lane.data_products(), holder);
        })
    }
}

impl std::fmt::Debug for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lane")
            .field("index", &self.index)
            .field("waiters", &self.waiters.len())
            .field("events_processed", &self.events_processed())
            .finish()
    }
}
