// テスト用の進捗報告モック実装

use super::traits::ProgressReporter;
use crate::core::{PipelineError, ProcessingSummary};

pub struct MockProgressReporter {
    pub started_called: std::sync::Arc<std::sync::Mutex<Option<(usize, Option<u64>)>>>,
    pub error_calls: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    pub completed_called: std::sync::Arc<std::sync::Mutex<Option<ProcessingSummary>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self {
            started_called: std::sync::Arc::new(std::sync::Mutex::new(None)),
            error_calls: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
            completed_called: std::sync::Arc::new(std::sync::Mutex::new(None)),
        }
    }
}

#[async_trait::async_trait]
impl ProgressReporter for MockProgressReporter {
    async fn report_started(&self, num_lanes: usize, max_events: Option<u64>) {
        *self.started_called.lock().unwrap() = Some((num_lanes, max_events));
    }

    async fn report_error(&self, error: &PipelineError) {
        self.error_calls.lock().unwrap().push(error.to_string());
    }

    async fn report_completed(&self, summary: &ProcessingSummary) {
        *self.completed_called.lock().unwrap() = Some(summary.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_progress_reporter_trait() {
        let reporter = MockProgressReporter::new();

        reporter.report_started(4, Some(100)).await;
        assert_eq!(*reporter.started_called.lock().unwrap(), Some((4, Some(100))));

        reporter.report_error(&PipelineError::setup_order(2)).await;
        assert_eq!(reporter.error_calls.lock().unwrap().len(), 1);

        let summary = ProcessingSummary::new(vec![60, 40], 1000);
        reporter.report_completed(&summary).await;
        let completed = reporter.completed_called.lock().unwrap();
        assert_eq!(completed.as_ref().unwrap().events_processed, 100);
    }

    #[tokio::test]
    async fn test_progress_reporter_thread_safety() {
        let reporter = MockProgressReporter::new();
        let reporter_ref: &dyn ProgressReporter = &reporter;

        reporter_ref.report_started(1, None).await;
        reporter_ref
            .report_completed(&ProcessingSummary::new(vec![1], 1))
            .await;

        assert!(reporter.started_called.lock().unwrap().is_some());
        assert!(reporter.completed_called.lock().unwrap().is_some());
    }
}
