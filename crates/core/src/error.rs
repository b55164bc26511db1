use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} '{id}'")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A model, scaler, schema or metrics artifact is missing or unreadable.
    #[error("Failed to load artifact {}: {reason}", path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    /// A loaded model broke its numeric contract (wrong width, bad probabilities).
    #[error("Model contract violated: {0}")]
    ModelContract(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}
