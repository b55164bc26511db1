//! Handlers for the model catalogue: variant metrics, the comparison
//! summary, and the per-variant input form.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use boxoffice_core::attributes::BudgetTierScheme;
use boxoffice_core::features::InputFieldSpec;
use boxoffice_core::metrics::{ComparisonSummary, HeadlineParam};
use boxoffice_core::types::Timestamp;
use boxoffice_core::variant::ModelVariant;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /models
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub variant: ModelVariant,
    pub name: String,
    pub algorithm: String,
    pub description: String,
    pub accuracy_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_score_pct: Option<f64>,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline_param: Option<HeadlineParam>,
    pub params: BTreeMap<String, serde_json::Value>,
    pub is_default: bool,
}

/// List every loaded variant with its training metrics.
pub async fn list_models(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let registry = state.registry()?;
    let models: Vec<ModelInfo> = registry
        .bundles()
        .map(|bundle| {
            let metrics = registry.variant_metrics(bundle.variant);
            ModelInfo {
                variant: bundle.variant,
                name: metrics.name.clone(),
                algorithm: metrics.algorithm.clone(),
                description: metrics.description.clone(),
                accuracy_pct: metrics.accuracy * 100.0,
                cv_score_pct: metrics.cv_score.map(|cv| cv * 100.0),
                n_features: bundle.schema.len(),
                feature_names: bundle.schema.names().to_vec(),
                headline_param: metrics.headline_param(),
                params: metrics.params.clone(),
                is_default: bundle.variant == state.config.default_variant,
            }
        })
        .collect();

    Ok(Json(DataResponse { data: models }))
}

// ---------------------------------------------------------------------------
// GET /models/comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ComparisonResponse {
    #[serde(flatten)]
    pub summary: ComparisonSummary,
    pub loaded_at: Timestamp,
}

/// Accuracy comparison across variants.
pub async fn comparison(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let registry = state.registry()?;
    Ok(Json(DataResponse {
        data: ComparisonResponse {
            summary: registry.metrics().summary(),
            loaded_at: registry.loaded_at(),
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /models/{variant}/form
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct InputForm {
    pub variant: ModelVariant,
    pub budget_tier_scheme: BudgetTierScheme,
    /// Optional inputs this variant's features depend on. The always-collected
    /// inputs (budget, runtime, ratings, release timing) are not listed.
    pub fields: Vec<InputFieldSpec>,
}

/// Describe the optional inputs the variant's feature schema needs.
pub async fn input_form(
    State(state): State<AppState>,
    Path(variant): Path<String>,
) -> AppResult<impl IntoResponse> {
    let variant: ModelVariant = variant.parse()?;
    let bundle = state.registry()?.bundle(variant);

    let fields = bundle
        .schema
        .input_fields()
        .into_iter()
        .map(|field| field.spec())
        .collect();

    Ok(Json(DataResponse {
        data: InputForm {
            variant,
            budget_tier_scheme: state.config.budget_tier_scheme,
            fields,
        },
    }))
}
