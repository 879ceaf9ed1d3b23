//! Feature vectors produced by the extractor.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FeatureShapeError {
    #[error("No feature rows to average")]
    NoRows,

    #[error("Feature rows are empty")]
    EmptyRow,

    #[error("Feature row {index} has length {actual}, expected {expected}")]
    RaggedRow {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Averaged activations of the extractor's penultimate layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Element-wise mean of equally sized rows.
    pub fn mean_of(rows: &[Vec<f32>]) -> Result<Self, FeatureShapeError> {
        let first = rows.first().ok_or(FeatureShapeError::NoRows)?;
        let width = first.len();
        if width == 0 {
            return Err(FeatureShapeError::EmptyRow);
        }

        let mut sums = vec![0.0f32; width];
        for (index, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(FeatureShapeError::RaggedRow {
                    index,
                    expected: width,
                    actual: row.len(),
                });
            }
            for (acc, value) in sums.iter_mut().zip(row) {
                *acc += value;
            }
        }

        let count = rows.len() as f32;
        Ok(Self(sums.into_iter().map(|s| s / count).collect()))
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}
