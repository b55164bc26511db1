//! Load-once registry of the model artifacts for every variant.
//!
//! Expected layout of the model directory:
//!
//! ```text
//! iteration_0_model.json      classifier (ModelArtifact)
//! iteration_0_scaler.json     fitted scaler (ScalerArtifact)
//! iteration_0_features.json   ordered feature names (FeatureSchema)
//! ... same for iteration_1 and iteration_2 ...
//! model_comparison.json       metrics for all variants (ComparisonMetrics)
//! ```
//!
//! Loading is all-or-nothing: one missing or malformed file fails the
//! whole registry.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::attributes::{BudgetTierScheme, MovieAttributes};
use crate::error::CoreError;
use crate::features::{assemble_checked, FeatureSchema};
use crate::metrics::{ComparisonMetrics, ModelMetrics};
use crate::model::{invoke, Classifier, ModelArtifact, Scaler, ScalerArtifact};
use crate::prediction::PredictionResult;
use crate::types::Timestamp;
use crate::variant::ModelVariant;

pub const METRICS_FILE: &str = "model_comparison.json";

/// Classifier, scaler and schema of one variant.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub variant: ModelVariant,
    pub classifier: ModelArtifact,
    pub scaler: ScalerArtifact,
    pub schema: FeatureSchema,
}

impl ModelBundle {
    /// Check that schema, scaler and classifier agree on the vector width.
    pub fn new(
        variant: ModelVariant,
        classifier: ModelArtifact,
        scaler: ScalerArtifact,
        schema: FeatureSchema,
    ) -> Result<Self, CoreError> {
        classifier.check()?;
        scaler.check()?;
        if schema.len() != scaler.n_features() || schema.len() != classifier.n_features() {
            return Err(CoreError::ModelContract(format!(
                "{variant}: schema has {} features, scaler {}, classifier {}",
                schema.len(),
                scaler.n_features(),
                classifier.n_features()
            )));
        }
        Ok(Self {
            variant,
            classifier,
            scaler,
            schema,
        })
    }

    /// Validate, assemble, scale and classify.
    pub fn predict(
        &self,
        attrs: &MovieAttributes,
        scheme: BudgetTierScheme,
    ) -> Result<PredictionResult, CoreError> {
        let raw = assemble_checked(attrs, &self.schema, scheme)?;
        let scaled = self.scaler.transform(&raw)?;
        invoke(&self.classifier, &scaled)
    }
}

/// Immutable set of loaded variants plus their metrics.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    bundles: BTreeMap<ModelVariant, ModelBundle>,
    metrics: ComparisonMetrics,
    loaded_at: Timestamp,
}

impl ModelRegistry {
    /// Assemble a registry from already loaded bundles. Every variant must
    /// be present.
    pub fn from_parts(
        bundles: Vec<ModelBundle>,
        metrics: ComparisonMetrics,
    ) -> Result<Self, CoreError> {
        let bundles: BTreeMap<_, _> = bundles.into_iter().map(|b| (b.variant, b)).collect();
        if let Some(missing) = ModelVariant::ALL.into_iter().find(|v| !bundles.contains_key(v)) {
            return Err(CoreError::ModelContract(format!("variant {missing} is missing")));
        }
        for bundle in bundles.values() {
            for name in bundle.schema.unrecognized() {
                tracing::warn!(
                    variant = %bundle.variant,
                    feature = name,
                    "Schema feature has no mapping rule and will always be 0",
                );
            }
        }
        Ok(Self {
            bundles,
            metrics,
            loaded_at: chrono::Utc::now(),
        })
    }

    /// Load every variant from `dir`.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, CoreError> {
        let dir = dir.as_ref();
        let mut bundles = Vec::with_capacity(ModelVariant::ALL.len());
        for variant in ModelVariant::ALL {
            let prefix = variant.as_str();
            let model_path = dir.join(format!("{prefix}_model.json"));
            let scaler_path = dir.join(format!("{prefix}_scaler.json"));
            let schema_path = dir.join(format!("{prefix}_features.json"));

            let classifier: ModelArtifact = read_json(&model_path)?;
            classifier.check().map_err(|e| load_error(&model_path, e))?;
            let scaler: ScalerArtifact = read_json(&scaler_path)?;
            scaler.check().map_err(|e| load_error(&scaler_path, e))?;
            let schema: FeatureSchema = read_json(&schema_path)?;

            // Blame the artifact whose width disagrees with the other two.
            let odd_one_out = if scaler.n_features() == classifier.n_features() {
                &schema_path
            } else if schema.len() == classifier.n_features() {
                &scaler_path
            } else {
                &model_path
            };
            let bundle = ModelBundle::new(variant, classifier, scaler, schema)
                .map_err(|e| load_error(odd_one_out, e))?;
            tracing::debug!(
                %variant,
                n_features = bundle.schema.len(),
                "Loaded model variant",
            );
            bundles.push(bundle);
        }
        let metrics_path = dir.join(METRICS_FILE);
        let metrics: ComparisonMetrics = read_json(&metrics_path)?;
        metrics.check().map_err(|e| load_error(&metrics_path, e))?;
        let registry = Self::from_parts(bundles, metrics)?;
        tracing::info!(dir = %dir.display(), "Model registry loaded");
        Ok(registry)
    }

    pub fn bundle(&self, variant: ModelVariant) -> &ModelBundle {
        // from_parts guarantees every variant is present.
        &self.bundles[&variant]
    }

    pub fn bundles(&self) -> impl Iterator<Item = &ModelBundle> {
        self.bundles.values()
    }

    pub fn metrics(&self) -> &ComparisonMetrics {
        &self.metrics
    }

    pub fn variant_metrics(&self, variant: ModelVariant) -> &ModelMetrics {
        self.metrics.get(variant)
    }

    pub fn loaded_at(&self) -> Timestamp {
        self.loaded_at
    }
}

fn load_error(path: &Path, err: CoreError) -> CoreError {
    CoreError::ArtifactLoad {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Read and deserialize one artifact file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
    let bytes = std::fs::read(path).map_err(|e| CoreError::ArtifactLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| CoreError::ArtifactLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::attributes::ReleaseTiming;
    use crate::prediction::SuccessLabel;

    fn write(dir: &Path, name: &str, value: serde_json::Value) {
        std::fs::write(dir.join(name), serde_json::to_vec(&value).unwrap()).unwrap();
    }

    /// Write a complete, small artifact set into `dir`.
    fn write_artifacts(dir: &Path) {
        let base = json!(["budget_log", "runtime", "vote_average", "imdb_rating"]);
        let identity4 = json!({"kind": "standard", "mean": [0, 0, 0, 0], "scale": [1, 1, 1, 1]});

        // Higher ratings sit closer to the Hit points.
        write(dir, "iteration_0_features.json", base.clone());
        write(dir, "iteration_0_scaler.json", identity4.clone());
        write(
            dir,
            "iteration_0_model.json",
            json!({
                "algorithm": "knn", "n_neighbors": 1,
                "training_points": [
                    [17.7, 120, 3.0, 3.0],
                    [17.7, 120, 6.0, 6.0],
                    [17.7, 120, 9.0, 9.0]
                ],
                "training_labels": [0, 1, 2]
            }),
        );

        write(dir, "iteration_1_features.json", base);
        write(dir, "iteration_1_scaler.json", identity4);
        write(
            dir,
            "iteration_1_model.json",
            json!({
                "algorithm": "random_forest", "n_features": 4,
                "trees": [{"nodes": [
                    {"type": "split", "feature": 2, "threshold": 5.0, "left": 1, "right": 2},
                    {"type": "leaf", "value": [7, 2, 1]},
                    {"type": "leaf", "value": [1, 2, 7]}
                ]}]
            }),
        );

        write(
            dir,
            "iteration_2_features.json",
            json!([
                "budget_log", "runtime", "vote_average", "imdb_rating",
                "is_summer_movie", "primary_genre_encoded", "budget_category_encoded"
            ]),
        );
        write(
            dir,
            "iteration_2_scaler.json",
            json!({"kind": "standard", "mean": [0, 0, 0, 0, 0, 0, 0], "scale": [1, 1, 1, 1, 1, 1, 1]}),
        );
        write(
            dir,
            "iteration_2_model.json",
            json!({
                "algorithm": "knn", "n_neighbors": 2, "weights": "distance", "metric": "manhattan",
                "training_points": [
                    [17.7, 120, 7.0, 7.0, 1, 0, 1],
                    [17.7, 120, 4.0, 4.0, 0, 2, 1]
                ],
                "training_labels": [2, 0]
            }),
        );

        write(
            dir,
            METRICS_FILE,
            json!({
                "iteration_0": {"name": "k-NN Baseline", "algorithm": "k-NN", "accuracy": 0.53,
                                "n_features": 4, "params": {"n_neighbors": 1}},
                "iteration_1": {"name": "Random Forest", "algorithm": "Random Forest",
                                "accuracy": 0.506, "n_features": 4, "params": {"n_estimators": 1}},
                "iteration_2": {"name": "Optimized k-NN", "algorithm": "k-NN", "accuracy": 0.492,
                                "n_features": 7, "cv_score": 0.527, "params": {"n_neighbors": 2}},
                "total_movies": 3
            }),
        );
    }

    fn attrs(rating: f64) -> MovieAttributes {
        MovieAttributes::new(50.0, 120, rating, rating, ReleaseTiming::Summer)
    }

    #[test]
    fn loads_all_variants() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        let registry = ModelRegistry::load_from_dir(dir.path()).unwrap();
        assert_eq!(registry.bundles().count(), 3);
        assert_eq!(registry.bundle(ModelVariant::Iteration2).schema.len(), 7);
        assert_eq!(registry.metrics().total_movies, 3);
    }

    #[test]
    fn predicts_with_each_variant() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        let registry = ModelRegistry::load_from_dir(dir.path()).unwrap();

        let baseline = registry.bundle(ModelVariant::Iteration0);
        let hit = baseline.predict(&attrs(8.8), BudgetTierScheme::ThreeTier).unwrap();
        assert_eq!(hit.label, SuccessLabel::Hit);
        let flop = baseline.predict(&attrs(2.5), BudgetTierScheme::ThreeTier).unwrap();
        assert_eq!(flop.label, SuccessLabel::Flop);

        let forest = registry.bundle(ModelVariant::Iteration1);
        let r = forest.predict(&attrs(7.5), BudgetTierScheme::ThreeTier).unwrap();
        assert_eq!(r.label, SuccessLabel::Hit);
        assert!((r.probabilities[2] - 0.7).abs() < 1e-12);

        let tuned = registry.bundle(ModelVariant::Iteration2);
        let r = tuned.predict(&attrs(7.0), BudgetTierScheme::ThreeTier).unwrap();
        assert_eq!(r.label, SuccessLabel::Hit);
    }

    #[test]
    fn prediction_rejects_out_of_range_attributes() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        let registry = ModelRegistry::load_from_dir(dir.path()).unwrap();
        let mut bad = attrs(7.0);
        bad.runtime = 500;
        assert_matches!(
            registry
                .bundle(ModelVariant::Iteration0)
                .predict(&bad, BudgetTierScheme::ThreeTier),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn missing_file_names_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        std::fs::remove_file(dir.path().join("iteration_1_scaler.json")).unwrap();
        let err = ModelRegistry::load_from_dir(dir.path()).unwrap_err();
        assert_matches!(err, CoreError::ArtifactLoad { ref path, .. }
            if path.ends_with("iteration_1_scaler.json"));
    }

    #[test]
    fn corrupt_metrics_fail_the_load() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        std::fs::write(dir.path().join(METRICS_FILE), b"{not json").unwrap();
        assert_matches!(
            ModelRegistry::load_from_dir(dir.path()),
            Err(CoreError::ArtifactLoad { .. })
        );
    }

    #[test]
    fn width_mismatch_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        write(
            dir.path(),
            "iteration_0_features.json",
            json!(["budget_log", "runtime", "vote_average"]),
        );
        let err = ModelRegistry::load_from_dir(dir.path()).unwrap_err();
        assert_matches!(err, CoreError::ArtifactLoad { ref path, ref reason }
            if path.ends_with("iteration_0_features.json") && reason.contains("schema has 3 features"));
    }

    #[test]
    fn scaler_width_mismatch_names_the_scaler() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        write(
            dir.path(),
            "iteration_1_scaler.json",
            json!({"kind": "standard", "mean": [0, 0, 0], "scale": [1, 1, 1]}),
        );
        let err = ModelRegistry::load_from_dir(dir.path()).unwrap_err();
        assert_matches!(err, CoreError::ArtifactLoad { ref path, .. }
            if path.ends_with("iteration_1_scaler.json"));
    }

    #[test]
    fn invalid_classifier_names_the_model_file() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        write(
            dir.path(),
            "iteration_2_model.json",
            json!({"algorithm": "knn", "n_neighbors": 0,
                   "training_points": [[0, 0, 0, 0, 0, 0, 0]], "training_labels": [1]}),
        );
        let err = ModelRegistry::load_from_dir(dir.path()).unwrap_err();
        assert_matches!(err, CoreError::ArtifactLoad { ref path, .. }
            if path.ends_with("iteration_2_model.json"));
    }
}
