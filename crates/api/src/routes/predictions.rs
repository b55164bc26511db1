use axum::routing::post;
use axum::Router;

use crate::handlers::prediction;
use crate::state::AppState;

/// Routes mounted at `/predictions`.
///
/// ```text
/// POST /    -> predict
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(prediction::predict))
}
