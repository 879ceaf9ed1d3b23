//! Activity label definitions.
//!
//! The label set is configuration: the same ordered set must be used when
//! scoring and when reporting results. Declaration order doubles as the
//! tie-break order when two labels end up with identical confidence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A recognizable human activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLabel {
    Sitting,
    Standing,
    Walking,
    Typing,
    Reading,
    Talking,
    Writing,
    Drinking,
    #[serde(rename = "using phone")]
    UsingPhone,
}

impl ActivityLabel {
    /// All labels in their canonical declaration order.
    pub const ALL: &'static [ActivityLabel] = &[
        ActivityLabel::Sitting,
        ActivityLabel::Standing,
        ActivityLabel::Walking,
        ActivityLabel::Typing,
        ActivityLabel::Reading,
        ActivityLabel::Talking,
        ActivityLabel::Writing,
        ActivityLabel::Drinking,
        ActivityLabel::UsingPhone,
    ];

    /// Returns the label name as reported to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLabel::Sitting => "sitting",
            ActivityLabel::Standing => "standing",
            ActivityLabel::Walking => "walking",
            ActivityLabel::Typing => "typing",
            ActivityLabel::Reading => "reading",
            ActivityLabel::Talking => "talking",
            ActivityLabel::Writing => "writing",
            ActivityLabel::Drinking => "drinking",
            ActivityLabel::UsingPhone => "using phone",
        }
    }
}

impl fmt::Display for ActivityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityLabel {
    type Err = ActivityLabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sitting" => Ok(ActivityLabel::Sitting),
            "standing" => Ok(ActivityLabel::Standing),
            "walking" => Ok(ActivityLabel::Walking),
            "typing" => Ok(ActivityLabel::Typing),
            "reading" => Ok(ActivityLabel::Reading),
            "talking" => Ok(ActivityLabel::Talking),
            "writing" => Ok(ActivityLabel::Writing),
            "drinking" => Ok(ActivityLabel::Drinking),
            "using phone" | "using-phone" | "using_phone" => Ok(ActivityLabel::UsingPhone),
            _ => Err(ActivityLabelParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown activity label: {0}")]
pub struct ActivityLabelParseError(String);

/// Fixed, ordered set of labels the scorers iterate over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLabelSet {
    labels: Vec<ActivityLabel>,
}

impl ActivityLabelSet {
    /// Build a label set, keeping the first occurrence of any duplicate.
    pub fn new(labels: impl IntoIterator<Item = ActivityLabel>) -> Self {
        let mut unique: Vec<ActivityLabel> = Vec::new();
        for label in labels {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        Self { labels: unique }
    }

    pub fn iter(&self) -> impl Iterator<Item = ActivityLabel> + '_ {
        self.labels.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Position of a label in declaration order.
    pub fn position(&self, label: ActivityLabel) -> Option<usize> {
        self.labels.iter().position(|l| *l == label)
    }

    pub fn as_slice(&self) -> &[ActivityLabel] {
        &self.labels
    }
}

impl Default for ActivityLabelSet {
    fn default() -> Self {
        Self::new(ActivityLabel::ALL.iter().copied())
    }
}
