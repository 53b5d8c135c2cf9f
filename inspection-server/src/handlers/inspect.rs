//! Inspection handlers
//!
//! The report is computed first; the admitted notification (if any) is then
//! handed to the dispatcher and never delays or alters the response.

use axum::{extract::State, Json};
use validator::Validate;

use damage_core::{ImageInspection, InspectionReport, VideoInspection};

use crate::{AppState, AppResult};
use crate::models::{InspectImageRequest, InspectVideoRequest};

/// Score one image's detections
pub async fn image(
    State(state): State<AppState>,
    Json(req): Json<InspectImageRequest>,
) -> AppResult<Json<InspectionReport>> {
    req.validate()?;
    let request: ImageInspection = req.into();

    // Model mode runs inference under the session lock
    let pipeline = state.pipeline.clone();
    let mut outcome = tokio::task::spawn_blocking(move || pipeline.inspect_image(&request)).await??;
    // Detached: runs to completion even if this request is dropped
    let _ = state.pipeline.schedule(&mut outcome);

    Ok(Json(outcome.report))
}

/// Accumulate a video's per-frame detections, score once
pub async fn video(
    State(state): State<AppState>,
    Json(req): Json<InspectVideoRequest>,
) -> AppResult<Json<InspectionReport>> {
    req.validate()?;
    let request: VideoInspection = req.into();

    let pipeline = state.pipeline.clone();
    let mut outcome = tokio::task::spawn_blocking(move || pipeline.inspect_replay(&request)).await??;
    let _ = state.pipeline.schedule(&mut outcome);

    if let Some(video) = &outcome.report.video {
        tracing::debug!(
            "Video {} processed {} frames ({:?})",
            outcome.report.source_name, video.frames_processed, video.termination
        );
    }

    Ok(Json(outcome.report))
}
