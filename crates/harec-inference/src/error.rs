//! Inference error types.

use thiserror::Error;

pub type InferenceResult<T> = Result<T, InferenceError>;

#[derive(Debug, Error)]
pub enum InferenceError {
    /// The pretrained model could not be fetched or turned into a session.
    /// Nothing is cached, so the next run retries.
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    /// The forward pass failed or produced an unusable shape.
    #[error("Feature extraction failed: {0}")]
    FeatureExtraction(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Model request failed with status {status}: {url}")]
    HttpStatus { status: u16, url: String },
}

impl InferenceError {
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    pub fn feature_extraction(msg: impl Into<String>) -> Self {
        Self::FeatureExtraction(msg.into())
    }

    /// Whether a model download attempt is worth repeating.
    pub fn is_retryable(&self) -> bool {
        match self {
            InferenceError::Network(_) => true,
            InferenceError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Collapse download errors into `ModelLoad`.
    pub fn into_model_load(self) -> Self {
        match self {
            InferenceError::ModelLoad(_) | InferenceError::FeatureExtraction(_) => self,
            other => InferenceError::ModelLoad(other.to_string()),
        }
    }
}
