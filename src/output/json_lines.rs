// JSON Lines 形式でのストリーミング書き出し
// 1行目にスキーマ、以降collate順に1イベント1行

use super::setup::{OutputSetup, Schema};
use super::timing::CollateTiming;
use super::{OutputSummary, Outputer};
use crate::core::{EventIdentifier, LaneIndex, PipelineError, PipelineResult};
use crate::source::DataProductRetriever;
use crate::task::{CollateFunnel, TaskHolder};
use anyhow::Context;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Serialize)]
struct HeaderLine<'a> {
    schema: &'a Schema,
    lanes: usize,
    created: String,
}

#[derive(Serialize)]
struct ProductLine<'a> {
    field: &'a str,
    size: usize,
    sha256: String,
}

#[derive(Serialize)]
struct EventLine<'a> {
    offset: u64,
    lane: LaneIndex,
    #[serde(flatten)]
    event: EventIdentifier,
    products: Vec<ProductLine<'a>>,
}

/// プロダクトの中身のダイジェスト（16進表記）
fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

struct JsonLinesInner {
    path: PathBuf,
    setup: OutputSetup,
    funnel: Arc<CollateFunnel>,
    timing: CollateTiming,
    // funnel内でのみ書き込まれるので競合しない
    writer: Mutex<Option<BufWriter<File>>>,
    first_error: Mutex<Option<anyhow::Error>>,
}

impl JsonLinesInner {
    fn write_header(&self, schema: &Schema) -> anyhow::Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("出力ファイルを作成できません: {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        let header = HeaderLine {
            schema,
            lanes: self.setup.num_lanes(),
            created: chrono::Utc::now().to_rfc3339(),
        };
        serde_json::to_writer(&mut writer, &header)?;
        writer.write_all(b"\n")?;

        *self.writer.lock().unwrap_or_else(|e| e.into_inner()) = Some(writer);
        Ok(())
    }

    fn collate(&self, offset: u64, lane: LaneIndex, event: EventIdentifier) {
        let start = Instant::now();
        match self.write_event(offset, lane, event) {
            Ok(()) => self.timing.record_collate(start),
            Err(error) => {
                self.timing.record_failed_collate(start);
                tracing::error!(offset, lane, %event, "failed to write event: {error:#}");
                let mut slot = self.first_error.lock().unwrap_or_else(|e| e.into_inner());
                if slot.is_none() {
                    *slot = Some(error);
                }
            }
        }
    }

    fn write_event(&self, offset: u64, lane: LaneIndex, event: EventIdentifier) -> anyhow::Result<()> {
        let schema = self
            .setup
            .schema()
            .ok_or(PipelineError::setup_order(lane))?;
        let entry = self.setup.entry(lane).ok_or(PipelineError::setup_order(lane))?;

        let guards: Vec<_> = entry.iter().map(|storage| storage.read()).collect();
        let products = schema
            .fields
            .iter()
            .zip(guards.iter())
            .map(|(field, bytes)| ProductLine {
                field,
                size: bytes.len(),
                sha256: digest(bytes),
            })
            .collect();
        let line = EventLine {
            offset,
            lane,
            event,
            products,
        };

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let writer = writer
            .as_mut()
            .context("出力ファイルが開かれていません")?;
        serde_json::to_writer(&mut *writer, &line)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// JSON Lines ファイルへの出力シンク
#[derive(Clone)]
pub struct JsonLinesOutputer {
    inner: Arc<JsonLinesInner>,
}

impl JsonLinesOutputer {
    pub fn new<P: AsRef<Path>>(path: P, num_lanes: usize) -> Self {
        Self {
            inner: Arc::new(JsonLinesInner {
                path: path.as_ref().to_path_buf(),
                setup: OutputSetup::new(num_lanes),
                funnel: CollateFunnel::new(),
                timing: CollateTiming::default(),
                writer: Mutex::new(None),
                first_error: Mutex::new(None),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

impl Outputer for JsonLinesOutputer {
    fn setup_for_lane(
        &self,
        lane: LaneIndex,
        data_products: &[DataProductRetriever],
    ) -> PipelineResult<()> {
        if let Some(schema) = self.inner.setup.setup_for_lane(lane, data_products)? {
            self.inner
                .write_header(schema)
                .map_err(PipelineError::output)?;
            tracing::info!(path = %self.inner.path.display(), fields = schema.fields.len(), "opened JSON Lines output");
        }
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
        self.inner.timing.log_summary("JsonLinesOutputer");
    }

    fn finish(&self) -> PipelineResult<OutputSummary> {
        if let Some(error) = self
            .inner
            .first_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            return Err(PipelineError::output(error));
        }
        if let Some(writer) = self
            .inner
            .writer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_mut()
        {
            writer
                .flush()
                .context("出力ファイルのフラッシュに失敗しました")
                .map_err(PipelineError::output)?;
        }
        Ok(OutputSummary {
            events_written: self.inner.timing.events(),
            collate_time: self.inner.timing.collate_time(),
            parallel_time: self.inner.timing.parallel_time(),
        })
    }
}
