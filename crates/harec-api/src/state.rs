//! Application state.

use std::sync::Arc;

use harec_inference::FeatureExtractorService;
use harec_pipeline::{ActivityRecognizer, PipelineConfig, PipelineResult};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub recognizer: Arc<ActivityRecognizer>,
}

impl AppState {
    /// Build state from environment configuration.
    pub fn new(config: ApiConfig) -> PipelineResult<Self> {
        let extractor = Arc::new(FeatureExtractorService::from_env());
        let recognizer = ActivityRecognizer::new(PipelineConfig::from_env(), extractor)?;
        Ok(Self::with_recognizer(config, recognizer))
    }

    pub fn with_recognizer(config: ApiConfig, recognizer: ActivityRecognizer) -> Self {
        Self {
            config,
            recognizer: Arc::new(recognizer),
        }
    }
}
