// EventCounter - 全レーンで共有するイベント番号カウンタ

use std::sync::atomic::{AtomicU64, Ordering};

/// ロックフリーの単調増加カウンタ
///
/// `claim` は呼び出しごとに重複しない番号を返す。
#[derive(Debug, Default)]
pub struct EventCounter {
    next: AtomicU64,
}

impl EventCounter {
    pub fn new(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// 次のイベント番号を取得する
    pub fn claim(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// これまでに払い出された番号の数（初期値からの差分ではなく次の値）
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
