// DataProductRetriever - レーンごと・プロダクトごとの再利用スロット

use crate::core::LaneIndex;
use crate::task::TaskHolder;
use std::sync::{Arc, RwLock, RwLockReadGuard};

/// プロダクトの中身を保持するストレージ
///
/// `Arc` のアドレスは実行全体で固定され、中身だけがイベントごとに上書きされる。
/// 書き込むのはそのレーンのためのイベントソースだけで、読むのはそのレーンの
/// 継続と、そのレーンのイベントを書き出す collate 処理だけ。レーン間で共有しない。
#[derive(Debug, Default)]
pub struct ProductStorage {
    contents: RwLock<Vec<u8>>,
}

impl ProductStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 中身を置き換える
    pub fn store(&self, bytes: Vec<u8>) {
        *self.contents.write().unwrap_or_else(|e| e.into_inner()) = bytes;
    }

    /// 中身を読み取る
    ///
    /// 返したガードを現在のイベントより長く保持してはならない。
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<u8>> {
        self.contents.read().unwrap_or_else(|e| e.into_inner())
    }

    /// 中身のバイト数
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// イベントソース側の非同期取得処理
///
/// 完了時（成功・失敗を問わず）に `holder` を解放しなければならない。
pub trait ProductRetrieval: Send + Sync {
    fn get_async(&self, slot: usize, storage: Arc<ProductStorage>, holder: TaskHolder);
}

/// 1つのデータプロダクトのスロット
///
/// 識別子は `(lane, slot)`。セットアップ時に一度だけ作られ、以後のイベントで
/// 再利用される。
#[derive(Clone)]
pub struct DataProductRetriever {
    lane: LaneIndex,
    slot: usize,
    name: String,
    class_type: String,
    storage: Arc<ProductStorage>,
    retrieval: Arc<dyn ProductRetrieval>,
}

impl DataProductRetriever {
    pub fn new(
        lane: LaneIndex,
        slot: usize,
        name: impl Into<String>,
        class_type: impl Into<String>,
        retrieval: Arc<dyn ProductRetrieval>,
    ) -> Self {
        Self {
            lane,
            slot,
            name: name.into(),
            class_type: class_type.into(),
            storage: ProductStorage::new(),
            retrieval,
        }
    }

    /// スロットを非同期に埋め、完了時に `holder` を解放する
    pub fn get_async(&self, holder: TaskHolder) {
        self.retrieval
            .get_async(self.slot, self.storage.clone(), holder);
    }

    pub fn lane(&self) -> LaneIndex {
        self.lane
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_type(&self) -> &str {
        &self.class_type
    }

    /// 現在の中身のバイト数
    pub fn size(&self) -> usize {
        self.storage.len()
    }

    /// 実行全体で固定されたストレージ
    pub fn address(&self) -> &Arc<ProductStorage> {
        &self.storage
    }
}

impl std::fmt::Debug for DataProductRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProductRetriever")
            .field("lane", &self.lane)
            .field("slot", &self.slot)
            .field("name", &self.name)
            .field("class_type", &self.class_type)
            .field("size", &self.size())
            .finish()
    }
}
