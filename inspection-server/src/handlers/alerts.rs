//! Alert classification handler

use axum::{extract::State, Json};

use crate::{AppError, AppState, AppResult};
use crate::models::{ClassifyRequest, ClassifyResponse};

/// Classify a raw severity score under the active thresholds
pub async fn classify(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> AppResult<Json<ClassifyResponse>> {
    if !req.score.is_finite() || req.score < 0.0 {
        return Err(AppError::ValidationError(
            "score must be a finite, non-negative number".to_string(),
        ));
    }

    let classification = state.pipeline.classify_score(req.score);
    let notify = state.pipeline.config().policy.allows(classification.tier);

    Ok(Json(ClassifyResponse {
        score: classification.score,
        tier: classification.tier,
        threshold_version: classification.threshold_version,
        notify,
    }))
}
