//! Success categories and the packaged output of a classifier call.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Revenue-to-budget ratio above which a movie counts as a Hit.
pub const HIT_REVENUE_RATIO: f64 = 2.5;
/// Revenue-to-budget ratio at or above which a movie breaks even.
pub const BREAK_EVEN_REVENUE_RATIO: f64 = 2.0;

/// Tolerance for a probability distribution summing to one.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Number of success categories (classifier output width).
pub const NUM_CLASSES: usize = 3;

// ---------------------------------------------------------------------------
// Success label
// ---------------------------------------------------------------------------

/// Ordered success category. The discriminant is the class index the
/// models were trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuccessLabel {
    Flop = 0,
    #[serde(rename = "Break-even")]
    BreakEven = 1,
    Hit = 2,
}

impl SuccessLabel {
    /// Labels in class-index order.
    pub const LABELS: [SuccessLabel; NUM_CLASSES] =
        [SuccessLabel::Flop, SuccessLabel::BreakEven, SuccessLabel::Hit];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::LABELS.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flop => "Flop",
            Self::BreakEven => "Break-even",
            Self::Hit => "Hit",
        }
    }

    /// Categorize a realized revenue-to-budget ratio.
    pub fn from_revenue_ratio(ratio: f64) -> Self {
        if ratio > HIT_REVENUE_RATIO {
            Self::Hit
        } else if ratio >= BREAK_EVEN_REVENUE_RATIO {
            Self::BreakEven
        } else {
            Self::Flop
        }
    }
}

impl fmt::Display for SuccessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Prediction result
// ---------------------------------------------------------------------------

/// Classifier output for one feature vector.
///
/// `label_index` is always the stable argmax of `probabilities`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: SuccessLabel,
    pub label_index: usize,
    pub probabilities: [f64; NUM_CLASSES],
}

impl PredictionResult {
    /// Package a validated distribution; the label is its stable argmax.
    pub fn from_probabilities(probabilities: &[f64]) -> Result<Self, CoreError> {
        let probabilities = validate_distribution(probabilities)?;
        let label_index = stable_argmax(&probabilities);
        let label = SuccessLabel::from_index(label_index).ok_or_else(|| {
            CoreError::Internal(format!("argmax {label_index} outside label range"))
        })?;
        Ok(Self {
            label,
            label_index,
            probabilities,
        })
    }

    /// Probability assigned to the predicted label.
    pub fn top_probability(&self) -> f64 {
        self.probabilities[self.label_index]
    }

    pub fn probability_of(&self, label: SuccessLabel) -> f64 {
        self.probabilities[label.index()]
    }
}

/// Index of the largest value; the lowest index wins ties.
///
/// Returns 0 for an empty slice.
pub fn stable_argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Check a class distribution: exactly three finite, non-negative
/// components summing to one.
pub fn validate_distribution(values: &[f64]) -> Result<[f64; NUM_CLASSES], CoreError> {
    let dist: [f64; NUM_CLASSES] = values.try_into().map_err(|_| {
        CoreError::ModelContract(format!(
            "expected {NUM_CLASSES} class probabilities, got {}",
            values.len()
        ))
    })?;
    if dist.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(CoreError::ModelContract(format!(
            "class probabilities must be finite and non-negative, got {dist:?}"
        )));
    }
    let sum: f64 = dist.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(CoreError::ModelContract(format!(
            "class probabilities must sum to 1, got {sum}"
        )));
    }
    Ok(dist)
}
