//! Handler for the grouped variance analysis over the movie dataset.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use boxoffice_core::variance::{self, GroupBy, VarianceMetric, VarianceQuery};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::ApiQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /analysis/variance`.
#[derive(Debug, Deserialize)]
pub struct VarianceParams {
    pub group_by: Option<String>,
    pub metric: Option<String>,
    /// `natural` (default), `asc`, `desc`, or a comma-separated category list.
    pub order: Option<String>,
    /// `mean` (default), `hit_threshold`, `revenue_threshold`, or a number.
    pub benchmark: Option<String>,
    pub min_group_size: Option<usize>,
    pub top_n: Option<usize>,
    /// Minimum |variance %| for a bar label.
    pub label_threshold: Option<f64>,
}

impl VarianceParams {
    fn into_query(self) -> AppResult<VarianceQuery> {
        let group_by: GroupBy = self
            .group_by
            .ok_or_else(|| AppError::BadRequest("group_by is required".into()))?
            .parse()?;
        let metric: VarianceMetric = self
            .metric
            .ok_or_else(|| AppError::BadRequest("metric is required".into()))?
            .parse()?;

        let mut query = VarianceQuery::new(group_by, metric);
        if let Some(order) = self.order {
            query.order = order.parse()?;
        }
        if let Some(benchmark) = self.benchmark {
            query.benchmark = benchmark.parse()?;
        }
        if let Some(min) = self.min_group_size {
            query.min_group_size = min;
        }
        query.top_n = self.top_n;
        if let Some(threshold) = self.label_threshold {
            query.label_threshold_pct = threshold;
        }
        Ok(query)
    }
}

/// Aggregate the dataset by the requested key and compare each group to
/// the benchmark.
pub async fn variance(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<VarianceParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.into_query()?;
    let records = state.records()?;
    let series = variance::analyze(records, &query)?;
    Ok(Json(DataResponse { data: series }))
}
