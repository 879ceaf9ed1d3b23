//! Feature extractor configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Pretrained classifier fetched on first use.
pub const DEFAULT_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/classification/mobilenet/model/mobilenetv2-7.onnx";

/// Memory layout of the model's image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputLayout {
    /// `[N, 3, H, W]`
    #[default]
    Nchw,
    /// `[N, H, W, 3]`
    Nhwc,
}

impl InputLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputLayout::Nchw => "nchw",
            InputLayout::Nhwc => "nhwc",
        }
    }
}

impl fmt::Display for InputLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nchw" => Ok(InputLayout::Nchw),
            "nhwc" => Ok(InputLayout::Nhwc),
            other => Err(format!("unknown input layout: {}", other)),
        }
    }
}

/// Configuration for model download and session setup.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// HTTPS URL, `file://` URL or plain filesystem path
    pub model_url: String,
    /// Per-attempt download timeout
    pub timeout: Duration,
    /// Extra download attempts after the first
    pub max_retries: u32,
    /// Output to read features from; `None` picks the penultimate output
    pub feature_output: Option<String>,
    pub input_layout: InputLayout,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model_url: DEFAULT_MODEL_URL.to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
            feature_output: None,
            input_layout: InputLayout::default(),
        }
    }
}

impl ExtractorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_url: std::env::var("HAREC_MODEL_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.model_url),
            timeout: std::env::var("HAREC_MODEL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: std::env::var("HAREC_MODEL_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            feature_output: std::env::var("HAREC_FEATURE_OUTPUT")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            input_layout: std::env::var("HAREC_INPUT_LAYOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.input_layout),
        }
    }
}
