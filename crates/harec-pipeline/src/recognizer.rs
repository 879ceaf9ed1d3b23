//! End-to-end recognition: validate, sample, extract, score.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::Instrument;

use harec_inference::FeatureExtractorService;
use harec_media::{DecoderFactory, FfmpegDecoderFactory, FrameSampler};
use harec_models::{ActivityScore, RunId, ScoreProvenance, VideoSource};
use harec_scoring::{ActivityScorer, FallbackScorer};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;

/// Result of one recognition run.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionOutcome {
    #[serde(skip)]
    pub run_id: RunId,
    /// Descending by confidence, first entry flagged as top
    pub scores: Vec<ActivityScore>,
    pub provenance: ScoreProvenance,
    /// Why the model path was abandoned, when it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl RecognitionOutcome {
    pub fn top(&self) -> Option<&ActivityScore> {
        self.scores.first()
    }
}

/// Runs the sampler, extractor and scorer, falling back to the filename
/// heuristic when any model stage fails.
pub struct ActivityRecognizer {
    config: PipelineConfig,
    sampler: FrameSampler,
    decoders: Arc<dyn DecoderFactory>,
    extractor: Arc<FeatureExtractorService>,
    scorer: ActivityScorer,
    fallback: FallbackScorer,
}

impl ActivityRecognizer {
    /// Recognizer sampling with FFmpeg and the default label set.
    pub fn new(
        config: PipelineConfig,
        extractor: Arc<FeatureExtractorService>,
    ) -> PipelineResult<Self> {
        let sampler = FrameSampler::new(config.effective_sample_count())?;
        Ok(Self {
            config,
            sampler,
            decoders: Arc::new(FfmpegDecoderFactory),
            extractor,
            scorer: ActivityScorer::default(),
            fallback: FallbackScorer::default(),
        })
    }

    pub fn with_decoders(mut self, decoders: Arc<dyn DecoderFactory>) -> Self {
        self.decoders = decoders;
        self
    }

    pub fn with_scorers(mut self, scorer: ActivityScorer, fallback: FallbackScorer) -> Self {
        self.scorer = scorer;
        self.fallback = fallback;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn extractor(&self) -> &Arc<FeatureExtractorService> {
        &self.extractor
    }

    /// Recognize activities in an upload with an OS-seeded fallback RNG.
    pub async fn recognize(&self, source: &VideoSource) -> PipelineResult<RecognitionOutcome> {
        let mut rng = StdRng::from_os_rng();
        self.recognize_with_rng(source, &mut rng).await
    }

    /// Recognize activities, drawing fallback confidences from `rng`.
    ///
    /// Validation failures are returned before any stage runs. Sampling,
    /// model load and extraction failures switch to the filename fallback,
    /// whose own failure is reported as `Processing`.
    pub async fn recognize_with_rng<R: Rng + Send + ?Sized>(
        &self,
        source: &VideoSource,
        rng: &mut R,
    ) -> PipelineResult<RecognitionOutcome> {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, "recognize");
        let span = logger.create_span();

        async move {
            source.validate()?;
            logger.log_start(&format!(
                "{} ({} bytes, {})",
                source.file_name(),
                source.size(),
                source.content_type()
            ));

            match self.score_with_model(source, &logger).await {
                Ok(scores) => {
                    log_top(&logger, &scores, ScoreProvenance::Model);
                    Ok(RecognitionOutcome {
                        run_id,
                        scores,
                        provenance: ScoreProvenance::Model,
                        fallback_reason: None,
                    })
                }
                Err(e) if e.is_recoverable() => {
                    logger.log_warning(&format!(
                        "model path failed, using filename fallback: {}",
                        e
                    ));
                    let scores = self.fallback.score(source.file_name(), rng).map_err(|fe| {
                        logger.log_error(&format!("fallback failed: {}", fe));
                        PipelineError::processing(format!("fallback failed after {}: {}", e, fe))
                    })?;
                    log_top(&logger, &scores, ScoreProvenance::Fallback);
                    Ok(RecognitionOutcome {
                        run_id,
                        scores,
                        provenance: ScoreProvenance::Fallback,
                        fallback_reason: Some(e.to_string()),
                    })
                }
                Err(e) => {
                    logger.log_error(&e.to_string());
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn score_with_model(
        &self,
        source: &VideoSource,
        logger: &RunLogger,
    ) -> PipelineResult<Vec<ActivityScore>> {
        let batch = self.sampler.sample(self.decoders.as_ref(), source).await?;
        logger.log_progress(&format!("sampled {} frames", batch.len()));

        let features = self.extractor.extract(batch).await?;
        logger.log_progress(&format!("extracted {} features", features.len()));

        Ok(self.scorer.score(&features)?)
    }
}

fn log_top(logger: &RunLogger, scores: &[ActivityScore], provenance: ScoreProvenance) {
    match scores.first() {
        Some(top) => logger.log_completion(&format!(
            "{} at {}% ({})",
            top.label,
            top.display_confidence(),
            provenance
        )),
        None => logger.log_completion(&format!("no scores ({})", provenance)),
    }
}
