//! Handler for running a prediction and presenting its result.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use boxoffice_core::attributes::{BudgetTierScheme, MovieAttributes};
use boxoffice_core::error::CoreError;
use boxoffice_core::prediction::PredictionResult;
use boxoffice_core::recommendation::{self, Assessment};
use boxoffice_core::types::Timestamp;
use boxoffice_core::variant::ModelVariant;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /predictions`.
#[derive(Debug, Deserialize, Validate)]
pub struct PredictionRequest {
    /// Variant identifier; the configured default when omitted.
    #[serde(default)]
    pub variant: Option<String>,
    #[validate(nested)]
    pub attributes: MovieAttributes,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction_id: Uuid,
    pub predicted_at: Timestamp,
    pub variant: ModelVariant,
    pub model_name: String,
    pub budget_tier_scheme: BudgetTierScheme,
    pub prediction: PredictionResult,
    pub assessment: Assessment,
}

/// Classify the attributes with the requested variant.
pub async fn predict(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PredictionRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate().map_err(CoreError::from)?;

    let variant = match body.variant.as_deref() {
        Some(v) => v.parse::<ModelVariant>()?,
        None => state.config.default_variant,
    };
    let registry = state.registry()?;
    let scheme = state.config.budget_tier_scheme;

    let prediction = registry.bundle(variant).predict(&body.attributes, scheme)?;
    let assessment = recommendation::assess(&prediction, body.attributes.budget);

    let response = PredictionResponse {
        prediction_id: Uuid::new_v4(),
        predicted_at: chrono::Utc::now(),
        variant,
        model_name: registry.variant_metrics(variant).name.clone(),
        budget_tier_scheme: scheme,
        prediction,
        assessment,
    };

    tracing::info!(
        prediction_id = %response.prediction_id,
        %variant,
        label = %response.prediction.label,
        confidence_pct = response.assessment.confidence_pct,
        "Prediction served",
    );

    Ok(Json(DataResponse { data: response }))
}
