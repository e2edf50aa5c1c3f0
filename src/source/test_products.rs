// TestProductsSource - 合成データを生成するイベントソース
// ベンチマークとテスト用。遅延をレーンごとに設定できる

use super::retriever::{DataProductRetriever, ProductRetrieval, ProductStorage};
use super::SharedSource;
use crate::core::{EventIdentifier, LaneIndex, PipelineError, PipelineResult};
use crate::task::{OptionalTaskHolder, TaskHolder};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 生成するプロダクトの定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSpec {
    pub name: String,
    pub class_type: String,
    pub size: usize,
}

impl ProductSpec {
    pub fn new(name: impl Into<String>, class_type: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            class_type: class_type.into(),
            size,
        }
    }

    /// `name:type:size` をカンマ区切りで並べた文字列を解析する
    pub fn parse_list(list: &str) -> PipelineResult<Vec<Self>> {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for ProductSpec {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 型名には "::" が含まれうるので、名前は最初の ':'、サイズは最後の ':' で切る
        let Some((name, class_type, size)) = s
            .split_once(':')
            .and_then(|(name, rest)| rest.rsplit_once(':').map(|(ty, size)| (name, ty, size)))
        else {
            return Err(PipelineError::configuration(format!(
                "プロダクト定義は name:type:size の形式が必要です: {s}"
            )));
        };
        if name.is_empty() || class_type.is_empty() {
            return Err(PipelineError::configuration(format!(
                "プロダクト名と型は空にできません: {s}"
            )));
        }
        let size = size.parse::<usize>().map_err(|e| {
            PipelineError::configuration(format!("プロダクトサイズが不正です: {s} ({e})"))
        })?;

        Ok(Self::new(name, class_type, size))
    }
}

/// レーンが現在位置付けられているイベント番号
#[derive(Debug, Default)]
struct LaneCursor {
    index: AtomicU64,
}

impl LaneCursor {
    fn current(&self) -> u64 {
        self.index.load(Ordering::Acquire)
    }
}

/// カーソルの位置に応じた決定的なバイト列でスロットを埋める
struct SyntheticRetrieval {
    cursor: Arc<LaneCursor>,
    specs: Arc<[ProductSpec]>,
    fill_delay: Duration,
}

impl SyntheticRetrieval {
    fn contents(&self, slot: usize) -> Vec<u8> {
        let index = self.cursor.current();
        let size = self.specs[slot].size;
        (0..size)
            .map(|i| (index as usize).wrapping_add(slot).wrapping_add(i) as u8)
            .collect()
    }
}

impl ProductRetrieval for SyntheticRetrieval {
    fn get_async(&self, slot: usize, storage: Arc<ProductStorage>, holder: TaskHolder) {
        let bytes = self.contents(slot);
        if self.fill_delay.is_zero() {
            storage.store(bytes);
            holder.release();
            return;
        }
        let group = holder.group().clone();
        group.run_after(self.fill_delay, move || {
            storage.store(bytes);
            holder.release();
        });
    }
}

struct LaneState {
    products: Vec<DataProductRetriever>,
    cursor: Arc<LaneCursor>,
}

/// 合成データのイベントソース
pub struct TestProductsSource {
    lanes: Vec<LaneState>,
    max_events: Option<u64>,
    failing_seeks: HashSet<u64>,
    seek_delays: Vec<Duration>,
    seeks: AtomicU64,
}

impl TestProductsSource {
    pub fn builder(num_lanes: usize) -> TestProductsSourceBuilder {
        TestProductsSourceBuilder::new(num_lanes)
    }

    /// 成功したシークの回数
    pub fn seeks(&self) -> u64 {
        self.seeks.load(Ordering::Acquire)
    }

    pub fn max_events(&self) -> Option<u64> {
        self.max_events
    }
}

impl SharedSource for TestProductsSource {
    fn num_lanes(&self) -> usize {
        self.lanes.len()
    }

    fn data_products(&self, lane: LaneIndex) -> &[DataProductRetriever] {
        &self.lanes[lane].products
    }

    fn event_identifier(&self, lane: LaneIndex) -> EventIdentifier {
        EventIdentifier::new(1, 1, self.lanes[lane].cursor.current())
    }

    fn may_be_able_to_go_to_event(&self, index: u64) -> bool {
        self.max_events.map_or(true, |max| index < max)
    }

    fn goto_event_async(&self, lane: LaneIndex, index: u64, on_positioned: OptionalTaskHolder) {
        if !self.may_be_able_to_go_to_event(index) {
            return;
        }
        if self.failing_seeks.contains(&index) {
            tracing::debug!(lane, index, "seek failed");
            return;
        }
        self.lanes[lane].cursor.index.store(index, Ordering::Release);
        self.seeks.fetch_add(1, Ordering::AcqRel);

        let delay = self.seek_delays[lane];
        if delay.is_zero() {
            on_positioned.release_to_run();
        } else {
            let group = on_positioned.group().clone();
            group.run_after(delay, move || on_positioned.release_to_run());
        }
    }

    fn print_summary(&self) {
        tracing::info!(
            seeks = self.seeks(),
            lanes = self.lanes.len(),
            "TestProductsSource finished"
        );
    }
}

/// `TestProductsSource` のビルダー
#[derive(Debug, Clone)]
pub struct TestProductsSourceBuilder {
    num_lanes: usize,
    products: Vec<ProductSpec>,
    max_events: Option<u64>,
    failing_seeks: HashSet<u64>,
    seek_delays: Vec<Duration>,
    fill_delay: Duration,
}

impl TestProductsSourceBuilder {
    fn new(num_lanes: usize) -> Self {
        Self {
            num_lanes,
            products: Vec::new(),
            max_events: None,
            failing_seeks: HashSet::new(),
            seek_delays: vec![Duration::ZERO; num_lanes],
            fill_delay: Duration::ZERO,
        }
    }

    pub fn product(mut self, spec: ProductSpec) -> Self {
        self.products.push(spec);
        self
    }

    pub fn products(mut self, specs: impl IntoIterator<Item = ProductSpec>) -> Self {
        self.products.extend(specs);
        self
    }

    /// イベント数の上限（未設定なら無制限）
    pub fn max_events(mut self, max_events: u64) -> Self {
        self.max_events = Some(max_events);
        self
    }

    /// 事前チェックは通るがシークに失敗するイベント番号
    ///
    /// 失敗したシークを要求したレーンはそこで終了する。
    pub fn fail_seek_at(mut self, index: u64) -> Self {
        self.failing_seeks.insert(index);
        self
    }

    /// 全レーンのシーク遅延
    pub fn seek_delay(mut self, delay: Duration) -> Self {
        self.seek_delays.iter_mut().for_each(|d| *d = delay);
        self
    }

    /// 特定レーンのシーク遅延
    pub fn lane_seek_delay(mut self, lane: LaneIndex, delay: Duration) -> Self {
        if let Some(d) = self.seek_delays.get_mut(lane) {
            *d = delay;
        }
        self
    }

    /// プロダクト取得ごとの遅延
    pub fn fill_delay(mut self, delay: Duration) -> Self {
        self.fill_delay = delay;
        self
    }

    pub fn build(self) -> PipelineResult<TestProductsSource> {
        if self.num_lanes == 0 {
            return Err(PipelineError::configuration("レーン数は1以上が必要です"));
        }
        let specs: Arc<[ProductSpec]> = self.products.into();

        let lanes = (0..self.num_lanes)
            .map(|lane| {
                let cursor = Arc::new(LaneCursor::default());
                let retrieval: Arc<dyn ProductRetrieval> = Arc::new(SyntheticRetrieval {
                    cursor: cursor.clone(),
                    specs: specs.clone(),
                    fill_delay: self.fill_delay,
                });
                let products = specs
                    .iter()
                    .enumerate()
                    .map(|(slot, spec)| {
                        DataProductRetriever::new(
                            lane,
                            slot,
                            spec.name.clone(),
                            spec.class_type.clone(),
                            retrieval.clone(),
                        )
                    })
                    .collect();
                LaneState { products, cursor }
            })
            .collect();

        Ok(TestProductsSource {
            lanes,
            max_events: self.max_events,
            failing_seeks: self.failing_seeks,
            seek_delays: self.seek_delays,
            seeks: AtomicU64::new(0),
        })
    }
}
