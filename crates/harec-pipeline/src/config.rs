//! Pipeline configuration.

use harec_media::DEFAULT_SAMPLE_COUNT;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Frames sampled per run in multi-frame mode
    pub sample_count: usize,
    /// When false a single frame is sampled at 25% of the duration
    pub multi_frame: bool,
    /// Include the result provenance in API responses
    pub expose_provenance: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            multi_frame: true,
            expose_provenance: false,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            sample_count: std::env::var("HAREC_SAMPLE_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_SAMPLE_COUNT),
            multi_frame: std::env::var("HAREC_MULTI_FRAME")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            expose_provenance: std::env::var("HAREC_EXPOSE_PROVENANCE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Number of frames a run actually samples.
    pub fn effective_sample_count(&self) -> usize {
        if self.multi_frame {
            self.sample_count.max(1)
        } else {
            1
        }
    }
}
