//! Synthetic per-label weight patterns.

use harec_models::ActivityLabel;

use crate::error::{ScoringError, ScoringResult};

/// Weight pattern for one label.
///
/// The label's weight vector is `weight` at every index divisible by
/// `stride` and zero elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelWeighting {
    pub stride: usize,
    pub multiplier: f32,
    pub weight: f32,
}

impl LabelWeighting {
    pub const fn new(stride: usize, multiplier: f32, weight: f32) -> Self {
        Self {
            stride,
            multiplier,
            weight,
        }
    }

    /// Sum of the features at indices divisible by the stride.
    pub fn strided_sum(&self, features: &[f32]) -> f32 {
        features.iter().step_by(self.stride).sum()
    }
}

/// Label to weighting map. Labels without an entry score from zero weights.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringTable {
    entries: Vec<(ActivityLabel, LabelWeighting)>,
}

impl ScoringTable {
    pub fn new(entries: Vec<(ActivityLabel, LabelWeighting)>) -> ScoringResult<Self> {
        for (index, (label, weighting)) in entries.iter().enumerate() {
            if weighting.stride == 0 {
                return Err(ScoringError::InvalidTable {
                    label: label.to_string(),
                    reason: "stride must be at least 1".to_string(),
                });
            }
            if !weighting.multiplier.is_finite() || !weighting.weight.is_finite() {
                return Err(ScoringError::InvalidTable {
                    label: label.to_string(),
                    reason: "multiplier and weight must be finite".to_string(),
                });
            }
            if entries[..index].iter().any(|(l, _)| l == label) {
                return Err(ScoringError::InvalidTable {
                    label: label.to_string(),
                    reason: "duplicate entry".to_string(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// The built-in table: sitting, walking and typing.
    pub fn standard() -> Self {
        Self {
            entries: vec![
                (ActivityLabel::Sitting, LabelWeighting::new(7, 1.0, 0.1)),
                (ActivityLabel::Walking, LabelWeighting::new(5, 2.0, 0.1)),
                (ActivityLabel::Typing, LabelWeighting::new(11, 1.5, 0.1)),
            ],
        }
    }

    pub fn get(&self, label: ActivityLabel) -> Option<&LabelWeighting> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, w)| w)
    }

    pub fn entries(&self) -> &[(ActivityLabel, LabelWeighting)] {
        &self.entries
    }

    /// Materialized weight vector for `label` at the given feature length.
    pub fn weight_vector(&self, label: ActivityLabel, len: usize) -> Vec<f32> {
        match self.get(label) {
            Some(w) => (0..len)
                .map(|i| if i % w.stride == 0 { w.weight } else { 0.0 })
                .collect(),
            None => vec![0.0; len],
        }
    }

    /// `dot(features, weights) * 100`, clamped to [0, 100].
    pub fn base(&self, label: ActivityLabel, features: &[f32]) -> f32 {
        let weights = self.weight_vector(label, features.len());
        let dot: f32 = features.iter().zip(&weights).map(|(f, w)| f * w).sum();
        (dot * 100.0).clamp(0.0, 100.0)
    }

    /// `strided_sum * multiplier * 10`; zero for labels without an entry.
    pub fn variation(&self, label: ActivityLabel, features: &[f32]) -> f32 {
        self.get(label)
            .map(|w| w.strided_sum(features) * w.multiplier * 10.0)
            .unwrap_or(0.0)
    }
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_entries() {
        let table = ScoringTable::standard();
        assert_eq!(
            table.get(ActivityLabel::Walking),
            Some(&LabelWeighting::new(5, 2.0, 0.1))
        );
        assert!(table.get(ActivityLabel::Reading).is_none());
        assert_eq!(table.entries().len(), 3);
    }

    #[test]
    fn test_weight_vector_pattern() {
        let table = ScoringTable::standard();
        let weights = table.weight_vector(ActivityLabel::Walking, 12);
        for (i, w) in weights.iter().enumerate() {
            let expected = if i % 5 == 0 { 0.1 } else { 0.0 };
            assert_eq!(*w, expected, "index {}", i);
        }
        assert!(table
            .weight_vector(ActivityLabel::Drinking, 12)
            .iter()
            .all(|w| *w == 0.0));
    }

    #[test]
    fn test_base_and_variation() {
        let table = ScoringTable::standard();
        // Sitting reads indices 0 and 7
        let mut features = vec![0.0f32; 10];
        features[0] = 1.0;
        features[7] = 0.5;

        assert!((table.base(ActivityLabel::Sitting, &features) - 15.0).abs() < 1e-4);
        assert!((table.variation(ActivityLabel::Sitting, &features) - 15.0).abs() < 1e-4);
        assert_eq!(table.base(ActivityLabel::Talking, &features), 0.0);
        assert_eq!(table.variation(ActivityLabel::Talking, &features), 0.0);
    }

    #[test]
    fn test_base_clamps() {
        let table = ScoringTable::standard();
        assert_eq!(table.base(ActivityLabel::Walking, &[50.0; 6]), 100.0);
        assert_eq!(table.base(ActivityLabel::Walking, &[-50.0; 6]), 0.0);
    }

    #[test]
    fn test_new_rejects_bad_entries() {
        assert!(ScoringTable::new(vec![(
            ActivityLabel::Sitting,
            LabelWeighting::new(0, 1.0, 0.1)
        )])
        .is_err());
        assert!(ScoringTable::new(vec![
            (ActivityLabel::Sitting, LabelWeighting::new(3, 1.0, 0.1)),
            (ActivityLabel::Sitting, LabelWeighting::new(4, 1.0, 0.1)),
        ])
        .is_err());
        assert!(ScoringTable::new(vec![(
            ActivityLabel::Sitting,
            LabelWeighting::new(3, f32::NAN, 0.1)
        )])
        .is_err());
    }
}
