//! Shared data models for the activity recognition backend.
//!
//! This crate provides:
//! - Activity labels and the ordered label set
//! - Sampled frames, frame batches and feature vectors
//! - Ranked activity scores
//! - Uploaded video sources and upload validation

pub mod feature;
pub mod frame;
pub mod label;
pub mod score;
pub mod video;

// Re-export common types
pub use feature::{FeatureShapeError, FeatureVector};
pub use frame::{
    normalize_channel, Frame, FrameBatch, FrameError, FRAME_CHANNELS, FRAME_HEIGHT, FRAME_WIDTH,
};
pub use label::{ActivityLabel, ActivityLabelParseError, ActivityLabelSet};
pub use score::{rank_scores, ActivityScore, ScoreProvenance};
pub use video::{
    validate_upload, RunId, ValidationError, VideoSource, MAX_UPLOAD_BYTES, VIDEO_MIME_PREFIX,
};
