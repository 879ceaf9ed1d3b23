//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation failed: {0}")]
    Validation(#[from] harec_models::ValidationError),

    #[error("Media error: {0}")]
    Media(#[from] harec_media::MediaError),

    #[error("Inference error: {0}")]
    Inference(#[from] harec_inference::InferenceError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] harec_scoring::ScoringError),

    /// Neither the model nor the fallback produced a result.
    #[error("Processing failed: {0}")]
    Processing(String),
}

impl PipelineError {
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    /// Whether the filename fallback should take over.
    ///
    /// Sampling, model load and extraction failures are recoverable; a
    /// rejected upload never reaches the pipeline.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::Media(_) | PipelineError::Inference(_) | PipelineError::Scoring(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harec_inference::InferenceError;
    use harec_media::MediaError;
    use harec_models::ValidationError;

    #[test]
    fn test_recoverable_errors() {
        assert!(PipelineError::from(MediaError::video_decode("seek", "eof")).is_recoverable());
        assert!(PipelineError::from(InferenceError::model_load("offline")).is_recoverable());
        assert!(!PipelineError::from(ValidationError::TooLarge {
            size: 101 * 1024 * 1024,
            max: 100 * 1024 * 1024,
        }).is_recoverable());
        assert!(!PipelineError::processing("no labels").is_recoverable());
    }
}
