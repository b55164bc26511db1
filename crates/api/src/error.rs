use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use boxoffice_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `boxoffice_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Model artifacts failed to load at startup; prediction is disabled.
    #[error("Models unavailable: {0}")]
    ModelsUnavailable(String),

    /// No analysis dataset is configured or it failed to load.
    #[error("Dataset unavailable: {0}")]
    DatasetUnavailable(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{id}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::ArtifactLoad { .. } | CoreError::ModelContract(_) => {
                    tracing::error!(error = %core, "Model error");
                    internal()
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            AppError::ModelsUnavailable(reason) => {
                tracing::warn!(%reason, "Prediction requested while models are unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MODELS_UNAVAILABLE",
                    "Prediction models are not loaded".to_string(),
                )
            }
            AppError::DatasetUnavailable(reason) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "DATASET_UNAVAILABLE",
                reason.clone(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
