//! Activity recognition pipeline.
//!
//! [`ActivityRecognizer`] chains the frame sampler, the feature extractor
//! and the activity scorer, and switches to the filename fallback when
//! any model stage fails.

pub mod config;
pub mod error;
pub mod logging;
pub mod recognizer;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::RunLogger;
pub use recognizer::{ActivityRecognizer, RecognitionOutcome};
