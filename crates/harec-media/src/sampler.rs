//! Frame sampling state machine.
//!
//! A run moves through `AwaitingMetadata -> Seeking(k) -> Captured(k) -> ...
//! -> Done`, or into `Failed` from any state. Captures are strictly
//! sequential: the seek for frame k+1 is only issued once frame k is stored.
//! A failed run discards every frame captured so far.

use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::{debug, info, warn};

use harec_models::{Frame, FrameBatch, VideoSource, FRAME_HEIGHT, FRAME_WIDTH};

use crate::decoder::{DecoderFactory, FrameDecoder};
use crate::error::{MediaError, MediaResult};

/// Default number of frames in multi-frame mode.
pub const DEFAULT_SAMPLE_COUNT: usize = 5;

/// Capture position used when only one frame is sampled.
pub const SINGLE_FRAME_FRACTION: f64 = 0.25;

/// Timestamp fractions for `count` evenly spaced samples.
///
/// `(k + 1) / (count + 1)` for k in `0..count`, which skips the very start
/// and end of the clip. A single sample sits at 25%.
pub fn sample_fractions(count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![SINGLE_FRAME_FRACTION];
    }
    (0..count)
        .map(|k| (k + 1) as f64 / (count + 1) as f64)
        .collect()
}

/// Where a sampling run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    AwaitingMetadata,
    Seeking(usize),
    Captured(usize),
    Done,
    Failed,
}

impl SamplerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SamplerState::Done | SamplerState::Failed)
    }

    fn stage(&self) -> String {
        match self {
            SamplerState::AwaitingMetadata => "metadata load".to_string(),
            SamplerState::Seeking(k) => format!("seek to frame {}", k),
            SamplerState::Captured(k) => format!("capture of frame {}", k),
            SamplerState::Done => "completion".to_string(),
            SamplerState::Failed => "failed run".to_string(),
        }
    }
}

/// Samples a fixed number of frames from a video.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    sample_count: usize,
}

impl FrameSampler {
    pub fn new(sample_count: usize) -> MediaResult<Self> {
        if sample_count == 0 {
            return Err(MediaError::InvalidSampleCount(sample_count));
        }
        Ok(Self { sample_count })
    }

    /// Sampler for single-frame mode.
    pub fn single_frame() -> Self {
        Self { sample_count: 1 }
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn fractions(&self) -> Vec<f64> {
        sample_fractions(self.sample_count)
    }

    /// Start a run over `decoder`. Drive it with [`SamplingRun::step`] or
    /// [`SamplingRun::finish`].
    pub fn start<'a, D: FrameDecoder + ?Sized>(&self, decoder: &'a mut D) -> SamplingRun<'a, D> {
        SamplingRun {
            decoder,
            fractions: self.fractions(),
            state: SamplerState::AwaitingMetadata,
            duration: None,
            frames: Vec::with_capacity(self.sample_count),
        }
    }

    /// Sample a batch using any decoder.
    pub async fn sample_with<D: FrameDecoder + ?Sized>(
        &self,
        decoder: &mut D,
    ) -> MediaResult<FrameBatch> {
        self.start(decoder).finish().await
    }

    /// Sample a batch from an uploaded video.
    ///
    /// The decoder, and with it any scratch copy of the upload, is dropped
    /// before this returns on success and on failure.
    pub async fn sample(
        &self,
        decoders: &dyn DecoderFactory,
        source: &VideoSource,
    ) -> MediaResult<FrameBatch> {
        let mut decoder = decoders
            .open(source)
            .await
            .map_err(|e| e.into_video_decode("decoder setup"))?;
        let batch = self.sample_with(decoder.as_mut()).await;
        drop(decoder);

        if let Ok(batch) = &batch {
            info!(
                file_name = %source.file_name(),
                frames = batch.len(),
                "Sampled video frames"
            );
        }
        batch
    }
}

/// One in-flight sampling run.
pub struct SamplingRun<'a, D: FrameDecoder + ?Sized> {
    decoder: &'a mut D,
    fractions: Vec<f64>,
    state: SamplerState,
    duration: Option<f64>,
    frames: Vec<Frame>,
}

impl<'a, D: FrameDecoder + ?Sized> SamplingRun<'a, D> {
    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn captured(&self) -> usize {
        self.frames.len()
    }

    /// Advance by one transition and return the new state.
    ///
    /// On failure the run moves to `Failed`, drops its frames and returns a
    /// `VideoDecode` error.
    pub async fn step(&mut self) -> MediaResult<SamplerState> {
        let current = self.state;
        let result = self.transition(current).await;

        match result {
            Ok(next) => {
                debug!(from = ?current, to = ?next, "Sampler transition");
                self.state = next;
                Ok(next)
            }
            Err(e) => {
                warn!(state = ?current, error = %e, "Frame sampling failed");
                self.state = SamplerState::Failed;
                self.frames.clear();
                Err(e.into_video_decode(current.stage()))
            }
        }
    }

    async fn transition(&mut self, state: SamplerState) -> MediaResult<SamplerState> {
        match state {
            SamplerState::AwaitingMetadata => {
                let duration = self.decoder.load_metadata().await?;
                if !duration.is_finite() || duration <= 0.0 {
                    return Err(MediaError::InvalidVideo(format!(
                        "unusable duration {}",
                        duration
                    )));
                }
                self.duration = Some(duration);
                Ok(SamplerState::Seeking(0))
            }
            SamplerState::Seeking(k) => {
                let fraction = self.fractions[k];
                let duration = self
                    .duration
                    .ok_or_else(|| MediaError::InvalidVideo("duration not loaded".to_string()))?;

                let image = self.decoder.capture(duration * fraction).await?;
                let frame = rasterize(fraction, image)?;
                self.frames.push(frame);
                Ok(SamplerState::Captured(k))
            }
            SamplerState::Captured(k) if k + 1 < self.fractions.len() => {
                Ok(SamplerState::Seeking(k + 1))
            }
            SamplerState::Captured(_) => Ok(SamplerState::Done),
            SamplerState::Done | SamplerState::Failed => Ok(state),
        }
    }

    /// Drive the run to a terminal state and return the batch.
    pub async fn finish(mut self) -> MediaResult<FrameBatch> {
        while !self.state.is_terminal() {
            self.step().await?;
        }

        if self.state == SamplerState::Failed {
            return Err(MediaError::video_decode(
                "failed run",
                "sampling run already failed",
            ));
        }

        FrameBatch::new(std::mem::take(&mut self.frames))
            .map_err(|e| MediaError::from(e).into_video_decode("batch assembly"))
    }
}

/// Stretch to the model input size and normalize to [-1, 1].
fn rasterize(fraction: f64, image: RgbImage) -> MediaResult<Frame> {
    let image = if image.dimensions() == (FRAME_WIDTH, FRAME_HEIGHT) {
        image
    } else {
        imageops::resize(&image, FRAME_WIDTH, FRAME_HEIGHT, FilterType::Triangle)
    };

    Ok(Frame::from_rgb8(
        fraction,
        FRAME_WIDTH,
        FRAME_HEIGHT,
        image.as_raw(),
    )?)
}
