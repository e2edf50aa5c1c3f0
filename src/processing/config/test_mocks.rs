// テスト用の設定モック実装

use super::traits::PipelineConfig;

pub struct MockPipelineConfig {
    pub lanes: usize,
    pub threads: usize,
    pub max_events: Option<u64>,
    pub scale_factor: f64,
    pub verbosity: u8,
}

impl PipelineConfig for MockPipelineConfig {
    fn num_lanes(&self) -> usize {
        self.lanes
    }

    fn num_threads(&self) -> usize {
        self.threads
    }

    fn max_events(&self) -> Option<u64> {
        self.max_events
    }

    fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    fn verbosity(&self) -> u8 {
        self.verbosity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_trait() {
        let config = MockPipelineConfig {
            lanes: 4,
            threads: 2,
            max_events: Some(100),
            scale_factor: -1.0,
            verbosity: 1,
        };

        assert_eq!(config.num_lanes(), 4);
        assert_eq!(config.num_threads(), 2);
        assert_eq!(config.max_events(), Some(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_lanes() {
        let config = MockPipelineConfig {
            lanes: 0,
            threads: 2,
            max_events: None,
            scale_factor: -1.0,
            verbosity: 0,
        };

        let config_ref: &dyn PipelineConfig = &config;
        assert!(config_ref.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_scale() {
        let config = MockPipelineConfig {
            lanes: 1,
            threads: 1,
            max_events: None,
            scale_factor: f64::NAN,
            verbosity: 0,
        };

        assert!(config.validate().is_err());
    }
}
