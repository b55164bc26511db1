#![allow(dead_code)]

use std::path::Path;

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use boxoffice_api::config::{LogFormat, ServerConfig};
use boxoffice_api::router::build_app_router;
use boxoffice_api::state::AppState;
use boxoffice_core::attributes::BudgetTierScheme;
use boxoffice_core::variant::ModelVariant;

/// Build a test `ServerConfig` pointing at the given artifact directory.
pub fn test_config(model_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        model_dir: model_dir.to_path_buf(),
        dataset_path: None,
        budget_tier_scheme: BudgetTierScheme::ThreeTier,
        default_variant: ModelVariant::Iteration0,
        log_format: LogFormat::Pretty,
    }
}

fn write(dir: &Path, name: &str, value: Value) {
    std::fs::write(dir.join(name), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

/// Write a small but complete artifact set.
///
/// Iteration 0 and 2 are 1-NN models whose Hit point has ratings of 8, Flop
/// point ratings of 3, and Break-even point ratings of 5.5. Iteration 1 is
/// a single-stump forest splitting on the audience rating at 6.
pub fn write_model_artifacts(dir: &Path) {
    let base = json!(["budget_log", "runtime", "vote_average", "imdb_rating"]);
    let identity = |n: usize| json!({"kind": "standard", "mean": vec![0.0; n], "scale": vec![1.0; n]});

    write(dir, "iteration_0_features.json", base.clone());
    write(dir, "iteration_0_scaler.json", identity(4));
    write(
        dir,
        "iteration_0_model.json",
        json!({
            "algorithm": "knn", "n_neighbors": 1,
            "training_points": [
                [17.7275, 120.0, 3.0, 3.0],
                [17.7275, 120.0, 5.5, 5.5],
                [17.7275, 120.0, 8.0, 8.0]
            ],
            "training_labels": [0, 1, 2]
        }),
    );

    write(dir, "iteration_1_features.json", base);
    write(dir, "iteration_1_scaler.json", identity(4));
    write(
        dir,
        "iteration_1_model.json",
        json!({
            "algorithm": "random_forest", "n_features": 4,
            "trees": [{"nodes": [
                {"type": "split", "feature": 2, "threshold": 6.0, "left": 1, "right": 2},
                {"type": "leaf", "value": [6, 3, 1]},
                {"type": "leaf", "value": [1, 3, 6]}
            ]}]
        }),
    );

    write(
        dir,
        "iteration_2_features.json",
        json!([
            "budget_log", "runtime", "vote_average", "imdb_rating", "is_summer_movie",
            "has_awards", "primary_genre_encoded", "rotten_tomatoes_score", "genre_count"
        ]),
    );
    write(dir, "iteration_2_scaler.json", identity(9));
    write(
        dir,
        "iteration_2_model.json",
        json!({
            "algorithm": "knn", "n_neighbors": 1, "metric": "manhattan",
            "training_points": [
                [17.7275, 120.0, 3.0, 3.0, 0, 0, 0, 70, 2],
                [17.7275, 120.0, 8.0, 8.0, 1, 0, 0, 70, 2]
            ],
            "training_labels": [0, 2]
        }),
    );

    write(
        dir,
        "model_comparison.json",
        json!({
            "iteration_0": {"name": "k-NN Baseline", "algorithm": "k-NN", "accuracy": 0.53,
                            "description": "Four base features", "n_features": 4,
                            "params": {"n_neighbors": 1}},
            "iteration_1": {"name": "Random Forest", "algorithm": "Random Forest",
                            "accuracy": 0.506, "n_features": 4,
                            "params": {"n_estimators": 1}},
            "iteration_2": {"name": "Optimized k-NN", "algorithm": "k-NN", "accuracy": 0.492,
                            "cv_score": 0.527, "n_features": 9,
                            "params": {"n_neighbors": 1, "metric": "manhattan"}},
            "total_movies": 3021
        }),
    );
}

/// Write a small analysis dataset and return its path.
pub fn write_dataset(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("movies.json");
    write(
        dir,
        "movies.json",
        json!([
            {"director": "Ava", "budget_category": "Low", "primary_genre": "Horror", "success_category": "Hit", "profit_ratio": 6.0},
            {"director": "Ava", "budget_category": "Low", "primary_genre": "Drama", "success_category": "Flop", "profit_ratio": 0.8},
            {"director": "Ben", "budget_category": "Medium", "primary_genre": "Comedy", "success_category": "Hit", "profit_ratio": 3.0},
            {"director": "Ava", "budget_category": "Medium", "primary_genre": "Drama", "success_category": "Break-even", "profit_ratio": 2.2},
            {"director": "Ben", "budget_category": "High", "primary_genre": "Action", "success_category": "Flop", "profit_ratio": 1.1},
            {"director": "Cal", "budget_category": "High", "primary_genre": "Action", "budget": 100000000.0, "revenue": 300000000.0}
        ]),
    );
    path
}

/// Build the application from a config through the production router.
pub fn build_app(config: ServerConfig) -> Router {
    build_app_router(AppState::load(config))
}

/// App with all models loaded and a dataset.
pub fn build_test_app() -> Router {
    let dir = tempfile::tempdir().unwrap();
    write_model_artifacts(dir.path());
    let mut config = test_config(dir.path());
    config.dataset_path = Some(write_dataset(dir.path()));
    // Artifacts are read into memory at load; the directory can go.
    build_app(config)
}

/// App whose model directory is empty.
pub fn build_app_without_models() -> Router {
    let dir = tempfile::tempdir().unwrap();
    build_app(test_config(dir.path()))
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
