//! Classifier and scaler capabilities, their serialized artifacts, and the
//! invoker that packages a classifier call into a [`PredictionResult`].

pub mod forest;
pub mod knn;
pub mod registry;
pub mod scaler;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::prediction::{stable_argmax, PredictionResult};

pub use forest::RandomForestClassifier;
pub use knn::KnnClassifier;
pub use registry::{ModelBundle, ModelRegistry};
pub use scaler::{Scaler, ScalerArtifact};

/// A trained three-class classifier over scaled feature vectors.
///
/// Class index 0 is Flop, 1 is Break-even, 2 is Hit.
pub trait Classifier: Send + Sync {
    /// Width of the feature vectors the model was trained on.
    fn n_features(&self) -> usize;

    fn class_probabilities(&self, x: &[f64]) -> Result<Vec<f64>, CoreError>;

    /// Predicted class index. Defaults to the stable argmax of the
    /// probabilities.
    fn classify(&self, x: &[f64]) -> Result<usize, CoreError> {
        Ok(stable_argmax(&self.class_probabilities(x)?))
    }

    fn check_width(&self, x: &[f64]) -> Result<(), CoreError> {
        if x.len() != self.n_features() {
            return Err(CoreError::ModelContract(format!(
                "classifier expects {} features, got {}",
                self.n_features(),
                x.len()
            )));
        }
        Ok(())
    }
}

/// Serialized classifier artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum ModelArtifact {
    Knn(KnnClassifier),
    RandomForest(RandomForestClassifier),
}

impl ModelArtifact {
    pub fn check(&self) -> Result<(), CoreError> {
        match self {
            Self::Knn(m) => m.check(),
            Self::RandomForest(m) => m.check(),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Self::Knn(m) => m,
            Self::RandomForest(m) => m,
        }
    }
}

impl Classifier for ModelArtifact {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn class_probabilities(&self, x: &[f64]) -> Result<Vec<f64>, CoreError> {
        self.inner().class_probabilities(x)
    }

    fn classify(&self, x: &[f64]) -> Result<usize, CoreError> {
        self.inner().classify(x)
    }
}

/// Run a classifier on an already scaled vector.
///
/// The distribution is validated and the label is its stable argmax. A
/// `classify` answer that disagrees with the argmax is logged and
/// overridden.
pub fn invoke(classifier: &dyn Classifier, scaled: &[f64]) -> Result<PredictionResult, CoreError> {
    classifier.check_width(scaled)?;
    let probabilities = classifier.class_probabilities(scaled)?;
    let result = PredictionResult::from_probabilities(&probabilities)?;

    let classified = classifier.classify(scaled)?;
    if classified != result.label_index {
        tracing::warn!(
            classified,
            argmax = result.label_index,
            ?probabilities,
            "Classifier label disagrees with its probabilities, using argmax",
        );
    }
    Ok(result)
}
