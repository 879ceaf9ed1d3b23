//! Ranked activity scores.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::label::ActivityLabel;

/// Confidence for one label within a ranked result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityScore {
    pub label: ActivityLabel,
    /// Percentage in [0, 100]
    pub confidence: f32,
    #[serde(rename = "isTop")]
    pub is_top: bool,
}

impl ActivityScore {
    /// Confidence formatted to one decimal place, as shown to users.
    pub fn display_confidence(&self) -> String {
        format!("{:.1}", self.confidence)
    }
}

/// Rank `(label, confidence)` pairs descending and flag the first entry.
///
/// Input order is the label set's declaration order; the sort is stable so
/// exact ties keep that order.
pub fn rank_scores(scored: Vec<(ActivityLabel, f32)>) -> Vec<ActivityScore> {
    let mut ranked: Vec<ActivityScore> = scored
        .into_iter()
        .map(|(label, confidence)| ActivityScore {
            label,
            confidence,
            is_top: false,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if let Some(top) = ranked.first_mut() {
        top.is_top = true;
    }

    ranked
}

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreProvenance {
    /// Feature extractor + activity scorer
    Model,
    /// Filename heuristic after a pipeline failure
    Fallback,
}

impl ScoreProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreProvenance::Model => "model",
            ScoreProvenance::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ScoreProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_descending_with_single_top() {
        let ranked = rank_scores(vec![
            (ActivityLabel::Sitting, 10.0),
            (ActivityLabel::Walking, 80.0),
            (ActivityLabel::Typing, 40.0),
        ]);
        let labels: Vec<_> = ranked.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![ActivityLabel::Walking, ActivityLabel::Typing, ActivityLabel::Sitting]
        );
        assert_eq!(ranked.iter().filter(|s| s.is_top).count(), 1);
        assert!(ranked[0].is_top);
    }

    #[test]
    fn test_rank_ties_keep_declaration_order() {
        let ranked = rank_scores(vec![
            (ActivityLabel::Standing, 5.0),
            (ActivityLabel::Reading, 5.0),
            (ActivityLabel::Talking, 5.0),
        ]);
        assert_eq!(ranked[0].label, ActivityLabel::Standing);
        assert_eq!(ranked[2].label, ActivityLabel::Talking);
        assert!(ranked[0].is_top);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank_scores(Vec::new()).is_empty());
    }

    #[test]
    fn test_display_confidence_one_decimal() {
        let score = ActivityScore {
            label: ActivityLabel::Typing,
            confidence: 87.456,
            is_top: true,
        };
        assert_eq!(score.display_confidence(), "87.5");
    }

    #[test]
    fn test_score_serializes_is_top_camel_case() {
        let score = ActivityScore {
            label: ActivityLabel::Walking,
            confidence: 50.0,
            is_top: false,
        };
        let json = serde_json::to_value(score).unwrap();
        assert_eq!(json["isTop"], serde_json::json!(false));
        assert_eq!(json["label"], serde_json::json!("walking"));
    }
}
