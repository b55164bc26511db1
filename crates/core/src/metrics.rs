//! Training metrics shipped alongside the model artifacts and the
//! comparison figures derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::threshold_validation::validate_unit_range;
use crate::variant::ModelVariant;

/// Accuracy of guessing one of three categories at random.
pub const RANDOM_GUESS_ACCURACY: f64 = 0.333;

/// Metrics record for one trained variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Display name, e.g. "k-NN Baseline".
    pub name: String,
    pub algorithm: String,
    /// Test-set accuracy in `[0, 1]`.
    pub accuracy: f64,
    #[serde(default)]
    pub description: String,
    pub n_features: u32,
    /// Hyperparameters as exported by the training pipeline.
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
    /// Mean cross-validation score, only recorded for tuned variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_score: Option<f64>,
}

/// The headline hyperparameter shown next to a variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineParam {
    pub label: &'static str,
    pub value: serde_json::Value,
}

impl ModelMetrics {
    /// `n_neighbors` for k-NN models, `n_estimators` for forests.
    pub fn headline_param(&self) -> Option<HeadlineParam> {
        if let Some(k) = self.params.get("n_neighbors") {
            Some(HeadlineParam {
                label: "k-value",
                value: k.clone(),
            })
        } else {
            self.params.get("n_estimators").map(|n| HeadlineParam {
                label: "Trees",
                value: n.clone(),
            })
        }
    }

    /// Cross-validation score minus test accuracy. Positive values hint at
    /// overfitting.
    pub fn overfitting_gap(&self) -> Option<f64> {
        self.cv_score.map(|cv| cv - self.accuracy)
    }

    /// Relative improvement over random guessing, percent.
    pub fn lift_over_random_pct(&self) -> f64 {
        (self.accuracy - RANDOM_GUESS_ACCURACY) / RANDOM_GUESS_ACCURACY * 100.0
    }
}

/// Contents of `model_comparison.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    pub iteration_0: ModelMetrics,
    pub iteration_1: ModelMetrics,
    pub iteration_2: ModelMetrics,
    /// Number of movies in the training dataset.
    pub total_movies: u64,
}

impl ComparisonMetrics {
    /// Scores must be fractions in `[0, 1]`.
    pub fn check(&self) -> Result<(), CoreError> {
        for v in ModelVariant::ALL {
            let m = self.get(v);
            validate_unit_range(m.accuracy, &format!("{v}.accuracy"))?;
            if let Some(cv) = m.cv_score {
                validate_unit_range(cv, &format!("{v}.cv_score"))?;
            }
        }
        Ok(())
    }

    pub fn get(&self, variant: ModelVariant) -> &ModelMetrics {
        match variant {
            ModelVariant::Iteration0 => &self.iteration_0,
            ModelVariant::Iteration1 => &self.iteration_1,
            ModelVariant::Iteration2 => &self.iteration_2,
        }
    }

    /// Highest test accuracy; earlier iterations win ties.
    pub fn best_variant(&self) -> ModelVariant {
        let mut best = ModelVariant::Iteration0;
        for v in ModelVariant::ALL.into_iter().skip(1) {
            if self.get(v).accuracy > self.get(best).accuracy {
                best = v;
            }
        }
        best
    }

    /// Relative accuracy change of `variant` against the baseline, percent.
    pub fn change_vs_baseline_pct(&self, variant: ModelVariant) -> f64 {
        let base = self.iteration_0.accuracy;
        if base == 0.0 {
            return 0.0;
        }
        (self.get(variant).accuracy - base) / base * 100.0
    }

    pub fn summary(&self) -> ComparisonSummary {
        let variants = ModelVariant::ALL
            .into_iter()
            .map(|v| {
                let m = self.get(v);
                VariantSummary {
                    variant: v,
                    name: m.name.clone(),
                    accuracy_pct: m.accuracy * 100.0,
                    change_vs_baseline_pct: self.change_vs_baseline_pct(v),
                    lift_over_random_pct: m.lift_over_random_pct(),
                    overfitting_gap_pct: m.overfitting_gap().map(|g| g * 100.0),
                }
            })
            .collect();
        ComparisonSummary {
            best_variant: self.best_variant(),
            total_movies: self.total_movies,
            max_features: ModelVariant::ALL
                .into_iter()
                .map(|v| self.get(v).n_features)
                .max()
                .unwrap_or(0),
            variants,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantSummary {
    pub variant: ModelVariant,
    pub name: String,
    pub accuracy_pct: f64,
    pub change_vs_baseline_pct: f64,
    pub lift_over_random_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overfitting_gap_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub best_variant: ModelVariant,
    pub total_movies: u64,
    pub max_features: u32,
    pub variants: Vec<VariantSummary>,
}
