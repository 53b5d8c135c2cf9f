//! Active scoring configuration

use axum::{extract::State, Json};

use damage_core::ScoringConfig;

use crate::AppState;

pub async fn get_config(State(state): State<AppState>) -> Json<ScoringConfig> {
    Json(state.pipeline.config().clone())
}
