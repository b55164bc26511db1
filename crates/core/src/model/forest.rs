//! Random forest classifier: averaged per-tree leaf class distributions.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::Classifier;
use crate::prediction::NUM_CLASSES;

/// One node of a fitted decision tree, in the flattened array layout the
/// training library exports (children always follow their parent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Go left when `x[feature] <= threshold`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class counts (or weighted counts) of the training samples in the leaf.
    Leaf { value: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn check(&self, n_features: usize) -> Result<(), CoreError> {
        if self.nodes.is_empty() {
            return Err(CoreError::ModelContract("decision tree has no nodes".into()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(CoreError::ModelContract(format!(
                            "node {i} splits on feature {feature} of {n_features}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(CoreError::ModelContract(format!(
                            "node {i} has a non-finite threshold"
                        )));
                    }
                    // Children must come later, which rules out cycles.
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(CoreError::ModelContract(format!(
                                "node {i} has invalid child {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != NUM_CLASSES {
                        return Err(CoreError::ModelContract(format!(
                            "leaf {i} has {} class values, expected {NUM_CLASSES}",
                            value.len()
                        )));
                    }
                    let total: f64 = value.iter().sum();
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) || total <= 0.0 {
                        return Err(CoreError::ModelContract(format!(
                            "leaf {i} has an invalid class distribution"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf `x` falls into.
    fn leaf_distribution(&self, x: &[f64]) -> Vec<f64> {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => {
                    let total: f64 = value.iter().sum();
                    return value.iter().map(|v| v / total).collect();
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    pub fn check(&self) -> Result<(), CoreError> {
        if self.trees.is_empty() {
            return Err(CoreError::ModelContract("random forest has no trees".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check(self.n_features).map_err(|e| match e {
                CoreError::ModelContract(msg) => CoreError::ModelContract(format!("tree {i}: {msg}")),
                other => other,
            })?;
        }
        Ok(())
    }
}

impl Classifier for RandomForestClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn class_probabilities(&self, x: &[f64]) -> Result<Vec<f64>, CoreError> {
        self.check_width(x)?;
        let mut sum = vec![0.0; NUM_CLASSES];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.leaf_distribution(x)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(sum.into_iter().map(|s| s / n).collect())
    }
}
