use std::sync::Arc;

use boxoffice_core::dataset::{self, MovieRecord};
use boxoffice_core::model::ModelRegistry;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// A startup-loaded resource, or the reason it could not be loaded.
#[derive(Debug, Clone)]
pub enum Loaded<T> {
    Ready(Arc<T>),
    Unavailable(String),
}

impl<T> Loaded<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything loaded at startup is immutable and behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Trained model variants. Prediction endpoints return 503 when unavailable.
    pub models: Loaded<ModelRegistry>,
    /// Historical movies for the variance analysis.
    pub dataset: Loaded<Vec<MovieRecord>>,
}

impl AppState {
    /// Load models and dataset as configured.
    ///
    /// Load failures are logged and leave the affected endpoints disabled;
    /// the server still starts.
    pub fn load(config: ServerConfig) -> Self {
        let models = match ModelRegistry::load_from_dir(&config.model_dir) {
            Ok(registry) => Loaded::Ready(Arc::new(registry)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    model_dir = %config.model_dir.display(),
                    "Failed to load model artifacts, prediction disabled",
                );
                Loaded::Unavailable(e.to_string())
            }
        };

        let dataset = match &config.dataset_path {
            None => Loaded::Unavailable("DATASET_PATH is not configured".to_string()),
            Some(path) => match dataset::load_dataset(path) {
                Ok(records) => Loaded::Ready(Arc::new(records)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load dataset, analysis disabled");
                    Loaded::Unavailable(e.to_string())
                }
            },
        };

        Self {
            config: Arc::new(config),
            models,
            dataset,
        }
    }

    pub fn registry(&self) -> AppResult<&ModelRegistry> {
        match &self.models {
            Loaded::Ready(registry) => Ok(registry.as_ref()),
            Loaded::Unavailable(reason) => Err(AppError::ModelsUnavailable(reason.clone())),
        }
    }

    pub fn records(&self) -> AppResult<&[MovieRecord]> {
        match &self.dataset {
            Loaded::Ready(records) => Ok(records.as_slice()),
            Loaded::Unavailable(reason) => Err(AppError::DatasetUnavailable(reason.clone())),
        }
    }
}
