//! Integration tests for `GET /api/v1/analysis/variance`.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use serde_json::Value;

async fn variance(query: &str) -> (StatusCode, Value) {
    let uri = format!("/api/v1/analysis/variance?{query}");
    let response = get(common::build_test_app(), &uri).await;
    let status = response.status();
    (status, body_json(response).await)
}

fn categories(data: &Value) -> Vec<&str> {
    data["bars"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["category"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn genre_hit_rate_against_mean() {
    let (status, json) = variance("group_by=primary_genre&metric=hit_rate").await;
    assert_eq!(status, StatusCode::OK);

    let data = &json["data"];
    assert_eq!(data["group_by"], "primary_genre");
    assert_eq!(data["metric"], "hit_rate");
    assert_eq!(data["benchmark"], 0.625);
    assert_eq!(categories(data), ["Action", "Comedy", "Drama", "Horror"]);

    let drama = &data["bars"][2];
    assert_eq!(drama["value"], 0.0);
    assert_eq!(drama["direction"], "bad");
    assert_eq!(drama["variance_pct"], -100.0);
    assert_eq!(drama["show_label"], true);

    assert_eq!(data["top_performer"]["category"], "Comedy");
    assert_eq!(data["top_performer"]["variance_pct"], 60.0);
}

#[tokio::test]
async fn budget_roi_against_hit_threshold() {
    let (status, json) = variance(
        "group_by=budget_category&metric=median_profit_ratio&benchmark=hit_threshold&order=desc",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let data = &json["data"];
    assert_eq!(data["benchmark"], 2.5);
    assert_eq!(categories(data), ["Low", "Medium", "High"]);

    let low = &data["bars"][0];
    assert!((low["value"].as_f64().unwrap() - 3.4).abs() < 1e-9);
    assert!((low["variance_pct"].as_f64().unwrap() - 36.0).abs() < 1e-9);
    assert_eq!(low["direction"], "good");

    // High mixes a recorded ratio with one derived from revenue and budget.
    let high = &data["bars"][2];
    assert_eq!(high["count"], 2);
    assert!((high["value"].as_f64().unwrap() - 2.05).abs() < 1e-9);
    assert_eq!(high["direction"], "bad");
}

#[tokio::test]
async fn explicit_order_and_min_group_size() {
    let (status, json) =
        variance("group_by=primary_genre&metric=hit_rate&order=Horror,Drama,Action&min_group_size=2")
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories(&json["data"]), ["Drama", "Action"]);
}

#[tokio::test]
async fn top_directors_by_hit_rate() {
    let (status, json) = variance("group_by=director&metric=hit_rate&order=desc&top_n=2").await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["group_by"], "director");
    assert_eq!(categories(data), ["Cal", "Ben"]);
    assert_eq!(data["benchmark"], 0.75);
}

#[tokio::test]
async fn missing_group_by_is_bad_request() {
    let (status, json) = variance("metric=hit_rate").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_query_value_is_bad_request() {
    let (status, json) = variance("group_by=primary_genre&metric=hit_rate&min_group_size=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("min_group_size"));
}

#[tokio::test]
async fn unknown_metric_is_validation_error() {
    let (status, json) = variance("group_by=primary_genre&metric=box_office").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn analysis_unavailable_without_dataset() {
    let response = get(
        common::build_app_without_models(),
        "/api/v1/analysis/variance?group_by=primary_genre&metric=hit_rate",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "DATASET_UNAVAILABLE");
}
