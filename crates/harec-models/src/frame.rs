//! Sampled frames and frame batches.

use thiserror::Error;

/// Width of every sampled frame, in pixels.
pub const FRAME_WIDTH: u32 = 224;
/// Height of every sampled frame, in pixels.
pub const FRAME_HEIGHT: u32 = 224;
/// RGB channel count.
pub const FRAME_CHANNELS: usize = 3;

/// Map an 8-bit channel value from [0, 255] to [-1, 1].
#[inline]
pub fn normalize_channel(value: u8) -> f32 {
    value as f32 / 127.5 - 1.0
}

#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("Pixel buffer has {actual} bytes, expected {expected} for {width}x{height} RGB")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Timestamp fraction {0} is outside [0, 1]")]
    Fraction(f64),

    #[error("Frame batch is empty")]
    EmptyBatch,

    #[error("Frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        index: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("Frame {index} was captured out of order")]
    OutOfOrder { index: usize },
}

/// A decoded RGB still, normalized to [-1, 1], in row-major HWC order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Position within the source duration (0.0-1.0) at capture time
    pub fraction: f64,
    pub width: u32,
    pub height: u32,
    pixels: Vec<f32>,
}

impl Frame {
    /// Build a frame from a packed RGB8 buffer.
    pub fn from_rgb8(
        fraction: f64,
        width: u32,
        height: u32,
        rgb: &[u8],
    ) -> Result<Self, FrameError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(FrameError::Fraction(fraction));
        }

        let expected = width as usize * height as usize * FRAME_CHANNELS;
        if rgb.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected,
                actual: rgb.len(),
            });
        }

        Ok(Self {
            fraction,
            width,
            height,
            pixels: rgb.iter().map(|&v| normalize_channel(v)).collect(),
        })
    }

    /// Normalized pixel values (HWC).
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    /// Number of scalar values in the frame.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// Frames of a single run in capture order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBatch {
    frames: Vec<Frame>,
}

impl FrameBatch {
    /// Build a batch, checking shared dimensions and ascending capture order.
    pub fn new(frames: Vec<Frame>) -> Result<Self, FrameError> {
        let first = frames.first().ok_or(FrameError::EmptyBatch)?;
        let (expected_width, expected_height) = (first.width, first.height);

        for (index, frame) in frames.iter().enumerate() {
            if frame.width != expected_width || frame.height != expected_height {
                return Err(FrameError::DimensionMismatch {
                    index,
                    width: frame.width,
                    height: frame.height,
                    expected_width,
                    expected_height,
                });
            }
            if index > 0 && frame.fraction <= frames[index - 1].fraction {
                return Err(FrameError::OutOfOrder { index });
            }
        }

        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Shared (width, height) of all frames.
    pub fn dimensions(&self) -> (u32, u32) {
        // Non-empty by construction
        self.frames
            .first()
            .map(|f| (f.width, f.height))
            .unwrap_or((0, 0))
    }

    pub fn fractions(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.fraction).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(fraction: f64, value: u8) -> Frame {
        let rgb = vec![value; (FRAME_WIDTH * FRAME_HEIGHT) as usize * FRAME_CHANNELS];
        Frame::from_rgb8(fraction, FRAME_WIDTH, FRAME_HEIGHT, &rgb).unwrap()
    }

    #[test]
    fn test_normalize_channel_bounds() {
        assert_eq!(normalize_channel(0), -1.0);
        assert_eq!(normalize_channel(255), 1.0);
        assert!(normalize_channel(128).abs() < 0.01);
    }

    #[test]
    fn test_frame_values_in_range() {
        let rgb: Vec<u8> = (0..(4 * 4 * 3)).map(|i| (i * 5) as u8).collect();
        let frame = Frame::from_rgb8(0.5, 4, 4, &rgb).unwrap();
        assert!(frame.pixels().iter().all(|v| (-1.0..=1.0).contains(v)));
        assert_eq!(frame.len(), 48);
    }

    #[test]
    fn test_frame_rejects_wrong_buffer() {
        let err = Frame::from_rgb8(0.5, 4, 4, &[0u8; 10]).unwrap_err();
        assert!(matches!(err, FrameError::BufferSize { expected: 48, actual: 10, .. }));
    }

    #[test]
    fn test_batch_requires_ascending_order() {
        let err = FrameBatch::new(vec![solid(0.5, 10), solid(0.25, 10)]).unwrap_err();
        assert_eq!(err, FrameError::OutOfOrder { index: 1 });
    }

    #[test]
    fn test_batch_requires_same_dimensions() {
        let small = Frame::from_rgb8(0.75, 2, 2, &[0u8; 12]).unwrap();
        let err = FrameBatch::new(vec![solid(0.25, 10), small]).unwrap_err();
        assert!(matches!(err, FrameError::DimensionMismatch { index: 1, .. }));
    }

    #[test]
    fn test_batch_empty() {
        assert_eq!(FrameBatch::new(Vec::new()).unwrap_err(), FrameError::EmptyBatch);
    }

    #[test]
    fn test_batch_dimensions() {
        let batch = FrameBatch::new(vec![solid(0.25, 1), solid(0.5, 2)]).unwrap();
        assert_eq!(batch.dimensions(), (FRAME_WIDTH, FRAME_HEIGHT));
        assert_eq!(batch.fractions(), vec![0.25, 0.5]);
    }
}
