//! k-nearest-neighbours classifier over the scaled training set.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::Classifier;
use crate::prediction::NUM_CLASSES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborWeights {
    /// Every neighbour votes once.
    #[default]
    Uniform,
    /// Votes weighted by inverse distance.
    Distance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
    /// Uses the classifier's `p`.
    Minkowski,
}

fn default_p() -> f64 {
    2.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnClassifier {
    pub n_neighbors: usize,
    #[serde(default)]
    pub weights: NeighborWeights,
    #[serde(default)]
    pub metric: DistanceMetric,
    #[serde(default = "default_p")]
    pub p: f64,
    /// Scaled training vectors.
    pub training_points: Vec<Vec<f64>>,
    /// Class index per training vector.
    pub training_labels: Vec<usize>,
}

impl KnnClassifier {
    pub fn check(&self) -> Result<(), CoreError> {
        if self.training_points.is_empty() {
            return Err(CoreError::ModelContract("k-NN has no training points".into()));
        }
        if self.training_points.len() != self.training_labels.len() {
            return Err(CoreError::ModelContract(format!(
                "k-NN has {} points but {} labels",
                self.training_points.len(),
                self.training_labels.len()
            )));
        }
        if self.n_neighbors == 0 || self.n_neighbors > self.training_points.len() {
            return Err(CoreError::ModelContract(format!(
                "n_neighbors must be between 1 and {}, got {}",
                self.training_points.len(),
                self.n_neighbors
            )));
        }
        let width = self.training_points[0].len();
        if self.training_points.iter().any(|p| p.len() != width) {
            return Err(CoreError::ModelContract(
                "k-NN training points have inconsistent widths".into(),
            ));
        }
        if let Some(bad) = self.training_labels.iter().find(|l| **l >= NUM_CLASSES) {
            return Err(CoreError::ModelContract(format!(
                "k-NN training label {bad} outside 0..{NUM_CLASSES}"
            )));
        }
        if self.metric == DistanceMetric::Minkowski && !(self.p >= 1.0 && self.p.is_finite()) {
            return Err(CoreError::ModelContract(format!(
                "Minkowski p must be >= 1, got {}",
                self.p
            )));
        }
        Ok(())
    }

    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let diffs = a.iter().zip(b).map(|(x, y)| (x - y).abs());
        match self.metric {
            DistanceMetric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            DistanceMetric::Manhattan => diffs.sum(),
            DistanceMetric::Minkowski => diffs.map(|d| d.powf(self.p)).sum::<f64>().powf(1.0 / self.p),
        }
    }

    /// `(distance, label)` of the k nearest training points.
    ///
    /// Equal distances keep training-set order.
    fn neighbors(&self, x: &[f64]) -> Vec<(f64, usize)> {
        let mut scored: Vec<(f64, usize)> = self
            .training_points
            .iter()
            .zip(&self.training_labels)
            .map(|(p, label)| (self.distance(x, p), *label))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(self.n_neighbors);
        scored
    }
}

impl Classifier for KnnClassifier {
    fn n_features(&self) -> usize {
        self.training_points.first().map_or(0, Vec::len)
    }

    fn class_probabilities(&self, x: &[f64]) -> Result<Vec<f64>, CoreError> {
        self.check_width(x)?;
        let neighbors = self.neighbors(x);
        let mut votes = vec![0.0; NUM_CLASSES];

        match self.weights {
            NeighborWeights::Uniform => {
                for (_, label) in &neighbors {
                    votes[*label] += 1.0;
                }
            }
            NeighborWeights::Distance => {
                // Exact matches take all of the weight.
                let exact: Vec<usize> = neighbors
                    .iter()
                    .filter(|(d, _)| *d == 0.0)
                    .map(|(_, l)| *l)
                    .collect();
                if exact.is_empty() {
                    for (d, label) in &neighbors {
                        votes[*label] += 1.0 / d;
                    }
                } else {
                    for label in exact {
                        votes[label] += 1.0;
                    }
                }
            }
        }

        let total: f64 = votes.iter().sum();
        Ok(votes.into_iter().map(|v| v / total).collect())
    }
}
