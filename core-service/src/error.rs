//! Error handling
//!
//! Error taxonomy of the inspection core:
//! - `InputError`: bad request data, aborts that request only
//! - `ConfigError`: bad thresholds/weights/model artifacts, fatal at startup
//! - `ModelError`: external severity model failed for a request
//! - `DispatchError`: outbound notification failed, never touches the result
//!
//! Zero detections is not an error anywhere in this crate.

use serde::Serialize;
use thiserror::Error;

use crate::logic::detection::DamageClass;

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    #[serde(rename = "detection_adapter")]
    Adapter,
    #[serde(rename = "feature_aggregator")]
    Aggregator,
    #[serde(rename = "severity_scorer")]
    Scorer,
    #[serde(rename = "video_accumulator")]
    Video,
    #[serde(rename = "configuration")]
    Configuration,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Adapter => "detection_adapter",
            Stage::Aggregator => "feature_aggregator",
            Stage::Scorer => "severity_scorer",
            Stage::Video => "video_accumulator",
            Stage::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// INPUT ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("detection #{index} is malformed: {reason}")]
    MalformedDetection { index: usize, reason: String },

    #[error("frame area must be a positive finite number, got {0}")]
    InvalidFrameArea(f32),

    #[error("media stream unreadable: {0}")]
    UnreadableStream(String),
}

impl InputError {
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        InputError::MalformedDetection { index, reason: reason.into() }
    }

    pub fn stage(&self) -> Stage {
        match self {
            InputError::MalformedDetection { .. } => Stage::Adapter,
            InputError::InvalidFrameArea(_) => Stage::Aggregator,
            InputError::UnreadableStream(_) => Stage::Video,
        }
    }
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("configuration version tag is empty")]
    MissingVersion,

    #[error("threshold '{name}' is not a finite number")]
    NonFiniteThreshold { name: &'static str },

    #[error("thresholds must be strictly ascending (low < medium < high), got {low} / {medium} / {high}")]
    ThresholdsNotAscending { low: f32, medium: f32, high: f32 },

    #[error("weight for '{class}' must be finite and non-negative, got {weight}")]
    InvalidWeight { class: DamageClass, weight: f32 },

    #[error("range for '{class}' must satisfy min < max, got ({min}, {max})")]
    InvalidRange { class: DamageClass, min: f32, max: f32 },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("unknown scoring mode '{0}' (expected 'linear' or 'model')")]
    UnknownMode(String),

    #[error("model artifact not found: {0}")]
    ModelMissing(String),

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("failed to load model: {0}")]
    ModelLoad(String),
}

// ============================================================================
// MODEL ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("severity model inference failed: {0}")]
    Inference(String),

    #[error("severity model returned an invalid score: {0}")]
    InvalidOutput(f32),
}

// ============================================================================
// DISPATCH ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum DispatchError {
    #[error("webhook responded with HTTP {status}")]
    Status { status: u16 },

    #[error("network error: {message}")]
    Transport { message: String },

    #[error("dispatch task did not complete: {message}")]
    Aborted { message: String },
}

// ============================================================================
// INSPECTION ERRORS (per request)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InspectionError {
    #[error("{0}")]
    Input(#[from] InputError),

    #[error("{0}")]
    Model(#[from] ModelError),
}

impl InspectionError {
    pub fn stage(&self) -> Stage {
        match self {
            InspectionError::Input(e) => e.stage(),
            InspectionError::Model(_) => Stage::Scorer,
        }
    }
}
