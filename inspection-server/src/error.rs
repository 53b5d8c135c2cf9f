//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use damage_core::{InspectionError, Stage};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Request errors
    #[error("{0}")]
    ValidationError(String),

    // Pipeline errors
    #[error("{message}")]
    InputError { stage: Stage, message: String },

    #[error("{0}")]
    ModelError(String),

    // Generic errors
    #[error("{0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, stage) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str(), None),
            AppError::InputError { stage, message } => (StatusCode::BAD_REQUEST, message.as_str(), Some(*stage)),
            AppError::ModelError(msg) => {
                tracing::error!("Severity model error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Severity model error", Some(Stage::Scorer))
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });
        if let Some(stage) = stage {
            body["stage"] = json!(stage.as_str());
        }

        (status, Json(body)).into_response()
    }
}

impl From<InspectionError> for AppError {
    fn from(err: InspectionError) -> Self {
        match err {
            InspectionError::Input(e) => AppError::InputError { stage: e.stage(), message: e.to_string() },
            InspectionError::Model(e) => AppError::ModelError(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("inspection task failed: {}", err))
    }
}
