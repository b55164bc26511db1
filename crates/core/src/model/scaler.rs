//! Fitted feature scalers exported by the training pipeline.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A deterministic transform fitted at training time.
pub trait Scaler: Send + Sync {
    fn n_features(&self) -> usize;

    fn transform(&self, raw: &[f64]) -> Result<Vec<f64>, CoreError>;
}

/// Serialized scaler artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// `(x - mean) / scale`.
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`.
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl ScalerArtifact {
    /// Structural checks run once at load time.
    pub fn check(&self) -> Result<(), CoreError> {
        let (offset, scale) = self.params();
        if offset.len() != scale.len() {
            return Err(CoreError::ModelContract(format!(
                "scaler has {} offsets but {} scales",
                offset.len(),
                scale.len()
            )));
        }
        if offset.iter().chain(scale).any(|v| !v.is_finite()) {
            return Err(CoreError::ModelContract(
                "scaler parameters must be finite".into(),
            ));
        }
        Ok(())
    }

    fn params(&self) -> (&[f64], &[f64]) {
        match self {
            Self::Standard { mean, scale } => (mean, scale),
            Self::MinMax { min, scale } => (min, scale),
        }
    }
}

impl Scaler for ScalerArtifact {
    fn n_features(&self) -> usize {
        self.params().1.len()
    }

    fn transform(&self, raw: &[f64]) -> Result<Vec<f64>, CoreError> {
        if raw.len() != self.n_features() {
            return Err(CoreError::ModelContract(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                raw.len()
            )));
        }
        let out = match self {
            Self::Standard { mean, scale } => raw
                .iter()
                .zip(mean.iter().zip(scale))
                // Constant columns are stored with a zero scale; leave them centred only.
                .map(|(x, (m, s))| if *s == 0.0 { x - m } else { (x - m) / s })
                .collect(),
            Self::MinMax { min, scale } => raw
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        };
        Ok(out)
    }
}
