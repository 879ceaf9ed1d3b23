//! Uploaded video sources and upload validation.

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Maximum accepted upload size (100 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Required MIME type prefix for uploads.
pub const VIDEO_MIME_PREFIX: &str = "video/";

/// Upload rejected before any pipeline stage runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid file type '{content_type}': please upload a video file")]
    InvalidType { content_type: String },

    #[error("File too large ({size} bytes): please upload a video smaller than 100MB")]
    TooLarge { size: u64, max: u64 },
}

/// Check an upload's MIME type and size.
pub fn validate_upload(content_type: &str, size: u64) -> Result<(), ValidationError> {
    if !content_type.starts_with(VIDEO_MIME_PREFIX) {
        return Err(ValidationError::InvalidType {
            content_type: content_type.to_string(),
        });
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size,
            max: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// An uploaded video clip. Immutable once constructed.
#[derive(Clone)]
pub struct VideoSource {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl VideoSource {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_upload(&self.content_type, self.size())
    }

    /// File extension including the dot, used when the bytes are spilled to disk.
    pub fn extension(&self) -> &str {
        self.file_name
            .rfind('.')
            .map(|idx| &self.file_name[idx..])
            .filter(|ext| ext.len() > 1 && ext.len() <= 8)
            .unwrap_or(".bin")
    }
}

impl fmt::Debug for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoSource")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Unique identifier for a recognition run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
