//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while probing and sampling video.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Umbrella error surfaced by the frame sampler for any probe, seek or
    /// raster failure. No partial batch accompanies it.
    #[error("Video decode failed during {stage}: {message}")]
    VideoDecode { stage: String, message: String },

    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("Sample count must be at least 1, got {0}")]
    InvalidSampleCount(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Frame error: {0}")]
    Frame(#[from] harec_models::FrameError),
}

impl MediaError {
    /// Create a video decode error for the given sampling stage.
    pub fn video_decode(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VideoDecode {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Fold any error into a `VideoDecode` tagged with `stage`.
    pub fn into_video_decode(self, stage: impl Into<String>) -> Self {
        match self {
            MediaError::VideoDecode { .. } => self,
            other => MediaError::video_decode(stage, other.to_string()),
        }
    }

    pub fn is_video_decode(&self) -> bool {
        matches!(self, MediaError::VideoDecode { .. })
    }
}
