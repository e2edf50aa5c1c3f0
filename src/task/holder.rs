// TaskHolder - 参照カウント付きの継続タスク
// 最後のクローンが解放された時点で継続をグループに投入する

use super::group::{TaskGroup, WorkGuard};
use std::sync::{Arc, Mutex};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// 完了トークン
///
/// クローンごとに共有カウントが1増え、ドロップごとに1減る。最後のドロップを
/// 行ったスレッドが継続をグループへ投入し、継続はちょうど一度だけ実行される。
/// 分岐ごとに1つのクローンを渡し、分岐の終了時にドロップすればjoinになる。
#[derive(Clone)]
pub struct TaskHolder {
    inner: Arc<HolderInner>,
}

struct HolderInner {
    group: TaskGroup,
    // クローンが別スレッドへ移動できるようにMutexで包む（ロックはDrop時のみ）
    task: Mutex<Option<Task>>,
    // taskを投入した後にドロップされるのでグループが途中で空にならない
    _work: WorkGuard,
}

impl Drop for HolderInner {
    fn drop(&mut self) {
        let task = self
            .task
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(task) = task {
            self.group.run(task);
        }
    }
}

impl TaskHolder {
    pub fn new<F>(group: &TaskGroup, task: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            inner: Arc::new(HolderInner {
                group: group.clone(),
                task: Mutex::new(Some(Box::new(task))),
                _work: group.work_guard(),
            }),
        }
    }

    /// このクローンを解放する（`drop` と同じ）
    pub fn release(self) {}

    /// 継続が投入されるグループ
    pub fn group(&self) -> &TaskGroup {
        &self.inner.group
    }

    /// 生存しているクローンの数
    pub fn live_copies(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl std::fmt::Debug for TaskHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHolder")
            .field("live_copies", &self.live_copies())
            .finish()
    }
}

/// 明示的に実行を許可された場合のみ継続を投入するホルダー
///
/// `release_to_run` されずにドロップされると継続は破棄される。イベントソースは
/// シークに失敗した場合にこれを単にドロップし、レーンはそこで終了する。
pub struct OptionalTaskHolder {
    group: TaskGroup,
    task: Option<Task>,
    _work: WorkGuard,
}

impl OptionalTaskHolder {
    pub fn new<F>(group: &TaskGroup, task: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            group: group.clone(),
            task: Some(Box::new(task)),
            _work: group.work_guard(),
        }
    }

    /// 継続をグループに投入する
    pub fn release_to_run(mut self) {
        if let Some(task) = self.task.take() {
            self.group.run(task);
        }
    }

    pub fn group(&self) -> &TaskGroup {
        &self.group
    }
}

impl Drop for OptionalTaskHolder {
    fn drop(&mut self) {
        if self.task.is_some() {
            tracing::trace!("optional task discarded without running");
        }
    }
}
