//! Notification delivery stats

use axum::{extract::State, Json};

use damage_core::logic::notify::DispatchStats;

use crate::AppState;

pub async fn stats(State(state): State<AppState>) -> Json<DispatchStats> {
    Json(state.pipeline.dispatcher().stats())
}
