//! FFmpeg CLI wrapper and frame sampling.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - FFprobe metadata parsing
//! - A sequential frame sampler that turns an uploaded clip into a batch of
//!   normalized 224x224 RGB frames

pub mod command;
pub mod decoder;
pub mod error;
pub mod probe;
pub mod sampler;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use decoder::{DecoderFactory, FfmpegDecoder, FfmpegDecoderFactory, FrameDecoder};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_video, VideoInfo};
pub use sampler::{
    sample_fractions, FrameSampler, SamplerState, SamplingRun, DEFAULT_SAMPLE_COUNT,
    SINGLE_FRAME_FRACTION,
};
