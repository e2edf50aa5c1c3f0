// TaskGroup - ワーカープール上のタスク群
// tokioランタイムのHandleをラップし、未完了の作業数を数える

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;

/// スケジューリンググループ
///
/// 全てのタスクは同じランタイム上に投入される。`wait` はキュー中・実行中の
/// タスクと生存中の `TaskHolder` が全てなくなるまで待機する。
#[derive(Clone)]
pub struct TaskGroup {
    inner: Arc<GroupInner>,
}

struct GroupInner {
    handle: Handle,
    outstanding: AtomicUsize,
    idle: Notify,
}

/// 未完了の作業1件分を表すガード
///
/// 生成時にカウンタを増やし、ドロップ時に減らす。
pub(crate) struct WorkGuard {
    inner: Arc<GroupInner>,
}

impl WorkGuard {
    fn new(inner: Arc<GroupInner>) -> Self {
        inner.outstanding.fetch_add(1, Ordering::AcqRel);
        Self { inner }
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        if self.inner.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

impl TaskGroup {
    /// 指定したランタイム上にグループを作成
    pub fn new(handle: Handle) -> Self {
        Self {
            inner: Arc::new(GroupInner {
                handle,
                outstanding: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// 現在のランタイム上にグループを作成
    ///
    /// tokioランタイムのコンテキスト外で呼ぶとpanicする。
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// タスクを投入する
    pub fn run<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = self.work_guard();
        self.inner.handle.spawn(async move {
            let _guard = guard;
            task();
        });
    }

    /// `delay` 経過後にタスクを投入する
    ///
    /// 待機はタイマーで表現されるのでワーカースレッドは占有されない。
    pub fn run_after<F>(&self, delay: Duration, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if delay.is_zero() {
            return self.run(task);
        }
        let guard = self.work_guard();
        self.inner.handle.spawn(async move {
            let _guard = guard;
            tokio::time::sleep(delay).await;
            task();
        });
    }

    /// 非同期処理をグループの作業として投入する
    pub fn spawn<Fut>(&self, future: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let guard = self.work_guard();
        self.inner.handle.spawn(async move {
            let _guard = guard;
            future.await;
        });
    }

    /// 未完了の作業数
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// 全ての作業が完了するまで待機
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    pub(crate) fn work_guard(&self) -> WorkGuard {
        WorkGuard::new(self.inner.clone())
    }
}

impl std::fmt::Debug for TaskGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGroup")
            .field("outstanding", &self.outstanding())
            .finish()
    }
}
