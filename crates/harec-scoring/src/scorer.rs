//! Feature vector to ranked activity scores.

use tracing::debug;

use harec_models::{rank_scores, ActivityLabelSet, ActivityScore, FeatureVector};

use crate::error::{ScoringError, ScoringResult};
use crate::table::ScoringTable;

/// Lowest confidence a model-scored label can receive.
pub const MIN_CONFIDENCE: f32 = 5.0;
/// Highest confidence a model-scored label can receive.
pub const MAX_CONFIDENCE: f32 = 95.0;

/// Maps averaged features to per-label confidences.
#[derive(Debug, Clone, Default)]
pub struct ActivityScorer {
    table: ScoringTable,
    labels: ActivityLabelSet,
}

impl ActivityScorer {
    pub fn new(table: ScoringTable, labels: ActivityLabelSet) -> Self {
        Self { table, labels }
    }

    pub fn table(&self) -> &ScoringTable {
        &self.table
    }

    pub fn labels(&self) -> &ActivityLabelSet {
        &self.labels
    }

    /// Score with base and variation terms; confidences land in [5, 95].
    pub fn score(&self, features: &FeatureVector) -> ScoringResult<Vec<ActivityScore>> {
        self.check(features)?;
        let values = features.values();

        let scored = self
            .labels
            .iter()
            .map(|label| {
                let base = self.table.base(label, values);
                let variation = self.table.variation(label, values);
                (label, (base + variation).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE))
            })
            .collect();

        let ranked = rank_scores(scored);
        if let Some(top) = ranked.first() {
            debug!(top = %top.label, confidence = top.confidence, "Scored features");
        }
        Ok(ranked)
    }

    /// Score with the base term only; confidences land in [0, 100].
    pub fn score_base_only(&self, features: &FeatureVector) -> ScoringResult<Vec<ActivityScore>> {
        self.check(features)?;
        let values = features.values();

        let scored = self
            .labels
            .iter()
            .map(|label| (label, self.table.base(label, values)))
            .collect();

        Ok(rank_scores(scored))
    }

    fn check(&self, features: &FeatureVector) -> ScoringResult<()> {
        if self.labels.is_empty() {
            return Err(ScoringError::EmptyLabelSet);
        }
        if features.is_empty() {
            return Err(ScoringError::EmptyFeatures);
        }
        if let Some(index) = features.values().iter().position(|v| !v.is_finite()) {
            return Err(ScoringError::NonFiniteFeature { index });
        }
        Ok(())
    }
}
