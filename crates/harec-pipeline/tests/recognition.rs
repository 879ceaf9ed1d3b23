//! End-to-end recognition runs with fake decoding and inference backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

use harec_inference::{
    BackendLoader, FeatureBackend, FeatureExtractorService, InferenceError, InferenceResult,
};
use harec_media::{DecoderFactory, FrameDecoder, MediaError, MediaResult};
use harec_models::{
    ActivityLabel, ActivityLabelSet, FrameBatch, ScoreProvenance, VideoSource, FRAME_HEIGHT,
    FRAME_WIDTH,
};
use harec_pipeline::{ActivityRecognizer, PipelineConfig, PipelineError};
use harec_scoring::{ActivityScorer, FallbackScorer, ScoringTable};

const MB: usize = 1024 * 1024;

#[derive(Default)]
struct Recorded {
    opened: AtomicUsize,
    seeks: Mutex<Vec<f64>>,
}

struct FakeDecoder {
    duration: f64,
    empty_input: bool,
    fail_capture: bool,
    recorded: Arc<Recorded>,
}

#[async_trait]
impl FrameDecoder for FakeDecoder {
    async fn load_metadata(&mut self) -> MediaResult<f64> {
        if self.empty_input {
            return Err(MediaError::InvalidVideo("No video stream found".to_string()));
        }
        Ok(self.duration)
    }

    async fn capture(&mut self, seconds: f64) -> MediaResult<RgbImage> {
        if self.fail_capture {
            return Err(MediaError::ffmpeg_failed("corrupt stream", None, Some(1)));
        }
        self.recorded.seeks.lock().unwrap().push(seconds);
        Ok(RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgb([200, 120, 40])))
    }
}

struct FakeDecoders {
    duration: f64,
    fail_capture: bool,
    recorded: Arc<Recorded>,
}

#[async_trait]
impl DecoderFactory for FakeDecoders {
    async fn open(&self, source: &VideoSource) -> MediaResult<Box<dyn FrameDecoder>> {
        self.recorded.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeDecoder {
            duration: self.duration,
            empty_input: source.bytes().is_empty(),
            fail_capture: self.fail_capture,
            recorded: self.recorded.clone(),
        }))
    }
}

/// Emits a feature row that only the walking weights pick up.
struct WalkingBackend;

impl FeatureBackend for WalkingBackend {
    fn forward(&self, batch: &FrameBatch) -> InferenceResult<Vec<Vec<f32>>> {
        let mut row = vec![0.0f32; 1280];
        for i in [5usize, 10, 15, 20, 25] {
            row[i] = 0.3;
        }
        Ok(vec![row; batch.len()])
    }
}

struct FakeLoader {
    available: bool,
    loads: Arc<AtomicUsize>,
}

#[async_trait]
impl BackendLoader for FakeLoader {
    async fn load(&self) -> InferenceResult<Arc<dyn FeatureBackend>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.available {
            return Err(InferenceError::model_load("model host unreachable"));
        }
        Ok(Arc::new(WalkingBackend))
    }
}

struct Harness {
    recognizer: ActivityRecognizer,
    recorded: Arc<Recorded>,
    loads: Arc<AtomicUsize>,
}

fn harness(duration: f64, fail_capture: bool, model_available: bool) -> Harness {
    let recorded = Arc::new(Recorded::default());
    let loads = Arc::new(AtomicUsize::new(0));
    let extractor = Arc::new(FeatureExtractorService::with_loader(FakeLoader {
        available: model_available,
        loads: loads.clone(),
    }));
    let recognizer = ActivityRecognizer::new(PipelineConfig::default(), extractor)
        .unwrap()
        .with_decoders(Arc::new(FakeDecoders {
            duration,
            fail_capture,
            recorded: recorded.clone(),
        }));

    Harness {
        recognizer,
        recorded,
        loads,
    }
}

#[tokio::test]
async fn typing_clip_falls_back_to_filename_when_model_is_down() {
    let h = harness(10.0, false, false);
    let source = VideoSource::new("typing_test.mov", "video/quicktime", vec![0u8; 50 * MB]);

    let outcome = h
        .recognizer
        .recognize_with_rng(&source, &mut StdRng::seed_from_u64(3))
        .await
        .unwrap();

    let seeks = h.recorded.seeks.lock().unwrap().clone();
    let expected: Vec<f64> = (1..=5).map(|k| 10.0 * k as f64 / 6.0).collect();
    assert_eq!(seeks.len(), 5);
    for (seek, want) in seeks.iter().zip(&expected) {
        assert!((seek - want).abs() < 1e-9, "seek {} != {}", seek, want);
    }

    assert_eq!(outcome.provenance, ScoreProvenance::Fallback);
    assert!(outcome.fallback_reason.is_some());
    let top = outcome.top().unwrap();
    assert_eq!(top.label, ActivityLabel::Typing);
    assert!(top.is_top);
    assert!(top.confidence >= 85.0 && top.confidence < 95.0);
    assert_eq!(outcome.scores.iter().filter(|s| s.is_top).count(), 1);
}

#[tokio::test]
async fn model_path_scores_features() {
    let h = harness(8.0, false, true);
    let source = VideoSource::new("clip.mp4", "video/mp4", vec![1u8; 1024]);

    let outcome = h.recognizer.recognize(&source).await.unwrap();

    assert_eq!(outcome.provenance, ScoreProvenance::Model);
    assert!(outcome.fallback_reason.is_none());
    assert_eq!(outcome.scores.len(), 9);
    assert_eq!(outcome.top().unwrap().label, ActivityLabel::Walking);
    assert!(outcome
        .scores
        .iter()
        .all(|s| (5.0..=95.0).contains(&s.confidence)));
    assert!(outcome
        .scores
        .windows(2)
        .all(|w| w[0].confidence >= w[1].confidence));
}

#[tokio::test]
async fn model_loads_once_across_runs() {
    let h = harness(4.0, false, true);
    let source = VideoSource::new("a.mp4", "video/mp4", vec![1u8; 16]);

    for _ in 0..3 {
        h.recognizer.recognize(&source).await.unwrap();
    }
    assert_eq!(h.loads.load(Ordering::SeqCst), 1);
    assert_eq!(h.recognizer.extractor().feature_len(), Some(1280));
}

#[tokio::test]
async fn failed_model_load_is_retried_next_run() {
    let h = harness(4.0, false, false);
    let source = VideoSource::new("a.mp4", "video/mp4", vec![1u8; 16]);

    h.recognizer.recognize(&source).await.unwrap();
    h.recognizer.recognize(&source).await.unwrap();
    assert_eq!(h.loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn decode_failure_falls_back() {
    let h = harness(10.0, true, true);
    let source = VideoSource::new("walking_demo.mp4", "video/mp4", vec![1u8; 2048]);

    let outcome = h
        .recognizer
        .recognize_with_rng(&source, &mut StdRng::seed_from_u64(11))
        .await
        .unwrap();

    assert_eq!(outcome.provenance, ScoreProvenance::Fallback);
    assert_eq!(outcome.top().unwrap().label, ActivityLabel::Walking);
    assert!(outcome
        .fallback_reason
        .as_deref()
        .unwrap()
        .contains("Video decode failed"));
    // The model is never needed when sampling fails
    assert_eq!(h.loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_upload_is_scored_by_the_fallback() {
    let h = harness(10.0, false, true);
    let source = VideoSource::new("walking_demo.mp4", "video/mp4", Vec::new());

    let outcome = h
        .recognizer
        .recognize_with_rng(&source, &mut StdRng::seed_from_u64(5))
        .await
        .unwrap();

    assert_eq!(h.recorded.opened.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.provenance, ScoreProvenance::Fallback);
    assert_eq!(outcome.top().unwrap().label, ActivityLabel::Walking);
    assert_eq!(outcome.scores.len(), 9);
    assert!(outcome
        .fallback_reason
        .as_deref()
        .unwrap()
        .contains("Video decode failed"));
}

#[tokio::test]
async fn oversized_upload_is_rejected_before_the_pipeline() {
    let h = harness(10.0, false, true);
    let source = VideoSource::new("typing_test.mov", "video/quicktime", vec![0u8; 101 * MB]);

    let err = h.recognizer.recognize(&source).await.unwrap_err();

    assert!(matches!(err, PipelineError::Validation(_)));
    assert!(!err.is_recoverable());
    assert_eq!(h.recorded.opened.load(Ordering::SeqCst), 0);
    assert_eq!(h.loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_video_upload_is_rejected() {
    let h = harness(10.0, false, true);
    let source = VideoSource::new("notes.txt", "text/plain", vec![1u8; 10]);

    let err = h.recognizer.recognize(&source).await.unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));
    assert_eq!(h.recorded.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fallback_failure_surfaces_processing_error() {
    let h = harness(10.0, true, false);
    let empty = ActivityLabelSet::new(Vec::new());
    let recognizer = h.recognizer.with_scorers(
        ActivityScorer::new(ScoringTable::standard(), empty.clone()),
        FallbackScorer::new(empty),
    );
    let source = VideoSource::new("clip.mp4", "video/mp4", vec![1u8; 10]);

    let err = recognizer.recognize(&source).await.unwrap_err();
    assert!(matches!(err, PipelineError::Processing(_)));
}

#[tokio::test]
async fn single_frame_mode_samples_at_quarter_duration() {
    let recorded = Arc::new(Recorded::default());
    let extractor = Arc::new(FeatureExtractorService::with_loader(FakeLoader {
        available: true,
        loads: Arc::new(AtomicUsize::new(0)),
    }));
    let config = PipelineConfig {
        multi_frame: false,
        ..Default::default()
    };
    let recognizer = ActivityRecognizer::new(config, extractor)
        .unwrap()
        .with_decoders(Arc::new(FakeDecoders {
            duration: 12.0,
            fail_capture: false,
            recorded: recorded.clone(),
        }));

    let source = VideoSource::new("clip.webm", "video/webm", vec![1u8; 10]);
    let outcome = recognizer.recognize(&source).await.unwrap();

    assert_eq!(outcome.provenance, ScoreProvenance::Model);
    assert_eq!(*recorded.seeks.lock().unwrap(), vec![3.0]);
}
