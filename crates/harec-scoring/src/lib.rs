//! Activity scoring.
//!
//! [`ActivityScorer`] turns an averaged feature vector into ranked label
//! confidences through a fixed synthetic [`ScoringTable`].
//! [`FallbackScorer`] produces results from the file name alone when the
//! model path cannot.

pub mod error;
pub mod fallback;
pub mod scorer;
pub mod table;

pub use error::{ScoringError, ScoringResult};
pub use fallback::{biased_label, BiasRule, FallbackScorer, BIAS_RULES, DEFAULT_BIAS};
pub use scorer::{ActivityScorer, MAX_CONFIDENCE, MIN_CONFIDENCE};
pub use table::{LabelWeighting, ScoringTable};
