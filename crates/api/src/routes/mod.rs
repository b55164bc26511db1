pub mod analysis;
pub mod health;
pub mod models;
pub mod predictions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /models                         list variants with metrics
/// /models/comparison              comparison summary
/// /models/{variant}/form          input fields the variant needs
///
/// /predictions                    run a prediction (POST)
///
/// /analysis/variance              grouped variance vs benchmark
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/models", models::router())
        .nest("/predictions", predictions::router())
        .nest("/analysis", analysis::router())
}
