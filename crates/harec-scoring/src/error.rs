//! Scoring error types.

use thiserror::Error;

pub type ScoringResult<T> = Result<T, ScoringError>;

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("Label set is empty")]
    EmptyLabelSet,

    #[error("Feature vector is empty")]
    EmptyFeatures,

    #[error("Feature value at index {index} is not finite")]
    NonFiniteFeature { index: usize },

    #[error("Invalid scoring table entry for {label}: {reason}")]
    InvalidTable { label: String, reason: String },
}
