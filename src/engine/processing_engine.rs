// ProcessingEngine - レーン群の構築と実行のオーケストレーション
// 依存関係は全てコンストラクタで注入される

use crate::{
    core::{PipelineError, PipelineResult, ProcessingSummary},
    lane::{EventCounter, Lane, LaneContext},
    output::Outputer,
    processing::{PipelineConfig, ProgressReporter},
    source::SharedSource,
    task::TaskGroup,
};
use std::sync::Arc;
use std::time::Instant;

/// レーン並列のイベント処理エンジン
///
/// ソースと出力シンクはトレイトオブジェクトとして共有し、設定と進捗報告は
/// ジェネリクスで受け取る。
pub struct ProcessingEngine<C, R> {
    source: Arc<dyn SharedSource>,
    outputer: Arc<dyn Outputer>,
    config: Arc<C>,
    reporter: Arc<R>,
}

impl<C, R> ProcessingEngine<C, R>
where
    C: PipelineConfig,
    R: ProgressReporter + 'static,
{
    pub fn new(
        source: Arc<dyn SharedSource>,
        outputer: Arc<dyn Outputer>,
        config: C,
        reporter: R,
    ) -> Self {
        Self {
            source,
            outputer,
            config: Arc::new(config),
            reporter: Arc::new(reporter),
        }
    }

    /// ソースが尽きるまで全レーンを実行する
    ///
    /// 現在のtokioランタイム上でレーンを起動し、全ての作業が終わるまで待つ。
    pub async fn run(&self) -> PipelineResult<ProcessingSummary> {
        match self.execute().await {
            Ok(summary) => {
                self.reporter.report_completed(&summary).await;
                Ok(summary)
            }
            Err(error) => {
                if error.is_fatal() {
                    tracing::error!(category = error.category(), %error, "pipeline aborted");
                } else {
                    tracing::warn!(category = error.category(), %error, "pipeline failed");
                }
                self.reporter.report_error(&error).await;
                Err(error)
            }
        }
    }

    async fn execute(&self) -> PipelineResult<ProcessingSummary> {
        self.config.validate()?;

        let num_lanes = self.config.num_lanes();
        if self.source.num_lanes() < num_lanes {
            return Err(PipelineError::configuration(format!(
                "ソースは{}レーンしか扱えません（要求: {num_lanes}）",
                self.source.num_lanes()
            )));
        }

        let lanes = self.build_lanes(num_lanes);
        self.setup_lanes(&lanes)?;

        self.reporter
            .report_started(num_lanes, self.config.max_events())
            .await;

        let start_time = Instant::now();
        let group = TaskGroup::current();
        let ctx = LaneContext::new(
            Arc::new(EventCounter::default()),
            group.clone(),
            Arc::clone(&self.outputer),
        )
        .with_verbose(self.config.verbosity() > 0);

        for lane in &lanes {
            let lane = Arc::clone(lane);
            let ctx = ctx.clone();
            group.run(move || lane.process_events_async(ctx));
        }
        drop(ctx);

        group.wait().await;
        let elapsed = start_time.elapsed();

        let events_per_lane = lanes.iter().map(|lane| lane.events_processed()).collect();
        let summary = ProcessingSummary::new(events_per_lane, elapsed.as_millis() as u64);
        tracing::info!(
            lanes = summary.num_lanes,
            events = summary.events_processed,
            elapsed_ms = summary.total_processing_time_ms,
            "all lanes finished"
        );

        self.source.print_summary();
        self.outputer.print_summary();
        let output = self.outputer.finish()?;
        tracing::debug!(
            written = output.events_written,
            collate_ms = output.collate_time.as_millis() as u64,
            "outputer finished"
        );

        Ok(summary)
    }

    fn build_lanes(&self, num_lanes: usize) -> Vec<Arc<Lane>> {
        let scale_factor = self.config.scale_factor();
        (0..num_lanes)
            .map(|index| Arc::new(Lane::new(index, Arc::clone(&self.source), scale_factor)))
            .collect()
    }

    /// レーン0から順にセットアップする（スキーマはレーン0が作る）
    fn setup_lanes(&self, lanes: &[Arc<Lane>]) -> PipelineResult<()> {
        for lane in lanes {
            self.outputer
                .setup_for_lane(lane.index(), lane.data_products())?;
            tracing::debug!(
                lane = lane.index(),
                products = lane.data_products().len(),
                "lane setup finished"
            );
        }
        Ok(())
    }

    /// 設定への参照を取得
    pub fn config(&self) -> &C {
        &self.config
    }

    /// レポーターへの参照を取得
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn outputer(&self) -> &Arc<dyn Outputer> {
        &self.outputer
    }
}
