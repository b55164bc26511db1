use axum::routing::get;
use axum::Router;

use crate::handlers::analysis;
use crate::state::AppState;

/// Routes mounted at `/analysis`.
///
/// ```text
/// GET /variance    -> variance (?group_by, ?metric, ?order, ?benchmark,
///                               ?min_group_size, ?label_threshold)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/variance", get(analysis::variance))
}
