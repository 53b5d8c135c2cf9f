//! Loaded model listing

use axum::{extract::State, Json};

use damage_core::logic::model::ModelDescriptor;

use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Json<Vec<ModelDescriptor>> {
    Json(state.registry.describe())
}
