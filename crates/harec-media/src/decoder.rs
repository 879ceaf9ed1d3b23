//! Frame decoding backends.
//!
//! A decoder owns whatever decode context it needs (scratch files, handles)
//! and releases it on drop, so every exit path of the sampler cleans up.

use async_trait::async_trait;
use image::RgbImage;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

use harec_models::{VideoSource, FRAME_HEIGHT, FRAME_WIDTH};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_video;

/// Source of still frames from a single video.
#[async_trait]
pub trait FrameDecoder: Send {
    /// Load metadata and return the duration in seconds.
    async fn load_metadata(&mut self) -> MediaResult<f64>;

    /// Seek to `seconds` and rasterize the displayed frame.
    ///
    /// Implementations should return `FRAME_WIDTH` x `FRAME_HEIGHT`; the
    /// sampler stretches anything else to that size.
    async fn capture(&mut self, seconds: f64) -> MediaResult<RgbImage>;
}

/// Opens a decoder for one upload.
#[async_trait]
pub trait DecoderFactory: Send + Sync {
    async fn open(&self, source: &VideoSource) -> MediaResult<Box<dyn FrameDecoder>>;
}

/// Opens [`FfmpegDecoder`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegDecoderFactory;

#[async_trait]
impl DecoderFactory for FfmpegDecoderFactory {
    async fn open(&self, source: &VideoSource) -> MediaResult<Box<dyn FrameDecoder>> {
        Ok(Box::new(FfmpegDecoder::open(source).await?))
    }
}

/// FFmpeg-backed decoder working on a private scratch copy of the upload.
pub struct FfmpegDecoder {
    scratch: TempDir,
    input: PathBuf,
    captures: usize,
    runner: FfmpegRunner,
}

impl FfmpegDecoder {
    /// Spill the source bytes into a fresh scratch directory.
    pub async fn open(source: &VideoSource) -> MediaResult<Self> {
        let scratch = tempfile::Builder::new().prefix("harec-").tempdir()?;
        let input = scratch.path().join(format!("source{}", source.extension()));
        tokio::fs::write(&input, source.bytes()).await?;

        debug!(
            file_name = %source.file_name(),
            size = source.size(),
            scratch = %scratch.path().display(),
            "Opened video for frame sampling"
        );

        Ok(Self {
            scratch,
            input,
            captures: 0,
            runner: FfmpegRunner::new(),
        })
    }

    /// Scratch directory holding the source copy and capture files.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }
}

#[async_trait]
impl FrameDecoder for FfmpegDecoder {
    async fn load_metadata(&mut self) -> MediaResult<f64> {
        let info = probe_video(&self.input).await?;
        debug!(duration = info.duration, "Probed video metadata");
        Ok(info.duration)
    }

    async fn capture(&mut self, seconds: f64) -> MediaResult<RgbImage> {
        let output = self
            .scratch
            .path()
            .join(format!("frame_{:03}.png", self.captures));
        self.captures += 1;

        // Stretch straight into the target size; aspect ratio is not kept
        let cmd = FfmpegCommand::new(&self.input, &output)
            .seek(seconds)
            .single_frame()
            .video_filter(format!("scale={}:{}", FRAME_WIDTH, FRAME_HEIGHT))
            .log_level("error");

        self.runner.run(&cmd).await?;

        let bytes = tokio::fs::read(&output).await?;
        if let Err(e) = tokio::fs::remove_file(&output).await {
            warn!("Failed to remove capture file {}: {}", output.display(), e);
        }

        Ok(image::load_from_memory(&bytes)?.to_rgb8())
    }
}
