//! Route definitions for the `/models` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::models;
use crate::state::AppState;

/// Routes mounted at `/models`.
///
/// ```text
/// GET /                  -> list_models
/// GET /comparison        -> comparison
/// GET /{variant}/form    -> input_form
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(models::list_models))
        .route("/comparison", get(models::comparison))
        .route("/{variant}/form", get(models::input_form))
}
