// CollateFunnel - 複数レーンからの投入を1つずつ実行するキュー
// 出力シンクの状態を変更する処理が同時に走らないことを保証する

use super::group::TaskGroup;
use crossbeam_queue::SegQueue;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

type CollateOp = Box<dyn FnOnce(u64) + Send + 'static>;

/// 直列実行キュー
///
/// `push` はどのスレッドからでも並行に呼べて即座に戻る。投入された処理は
/// グループ上で一度に1つだけ実行され、実行順に0から始まる出力オフセットを
/// 受け取る。オフセットはレコード番号でありイベント番号ではない。
pub struct CollateFunnel {
    queue: SegQueue<CollateOp>,
    running: AtomicBool,
    next_offset: AtomicU64,
}

impl Default for CollateFunnel {
    fn default() -> Self {
        Self {
            queue: SegQueue::new(),
            running: AtomicBool::new(false),
            next_offset: AtomicU64::new(0),
        }
    }
}

impl CollateFunnel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 処理をキューに追加する
    pub fn push<F>(self: &Arc<Self>, group: &TaskGroup, op: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.queue.push(Box::new(op));
        self.try_start(group);
    }

    /// これまでに実行された処理の数
    pub fn executed(&self) -> u64 {
        self.next_offset.load(Ordering::Acquire)
    }

    /// 未実行の処理の数
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn try_start(self: &Arc<Self>, group: &TaskGroup) {
        loop {
            if self
                .running
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                // 実行中の処理が終了時にキューを再確認する
                return;
            }

            match self.queue.pop() {
                Some(op) => {
                    let funnel = self.clone();
                    let next_group = group.clone();
                    group.run(move || {
                        let offset = funnel.next_offset.fetch_add(1, Ordering::AcqRel);
                        // opがpanicしても巻き戻し中にフラグを下ろして次を起動する
                        let _running = RunningGuard {
                            funnel,
                            group: next_group,
                        };
                        op(offset);
                    });
                    return;
                }
                None => {
                    self.running.store(false, Ordering::SeqCst);
                    // フラグを下ろす直前にpushされた処理を取りこぼさない
                    if self.queue.is_empty() {
                        return;
                    }
                }
            }
        }
    }
}

/// 実行中フラグの解除と次の処理の起動
struct RunningGuard {
    funnel: Arc<CollateFunnel>,
    group: TaskGroup,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::error!("collate operation panicked, continuing with the next one");
        }
        self.funnel.running.store(false, Ordering::SeqCst);
        self.funnel.try_start(&self.group);
    }
}

impl std::fmt::Debug for CollateFunnel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollateFunnel")
            .field("pending", &self.pending())
            .field("executed", &self.executed())
            .finish()
    }
}
