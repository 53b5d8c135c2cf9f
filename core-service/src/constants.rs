//! Central Configuration Constants
//!
//! Single source of truth for environment variable names and defaults.

use std::path::PathBuf;

use crate::logic::model::OnnxOptions;
use crate::logic::notify::WebhookPlatform;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Container Damage Inspection";

/// Webhook endpoint; notifications are only logged when unset
pub const WEBHOOK_URL_ENV: &str = "WEBHOOK_URL";

/// slack | discord | teams | generic
pub const WEBHOOK_PLATFORM_ENV: &str = "WEBHOOK_PLATFORM";

/// Severity model artifact (.onnx or .json coefficients)
pub const SEVERITY_MODEL_PATH_ENV: &str = "SEVERITY_MODEL_PATH";

/// Expected hex SHA-256 of the model artifact
pub const SEVERITY_MODEL_SHA256_ENV: &str = "SEVERITY_MODEL_SHA256";

/// ONNX output tensor name
pub const SEVERITY_MODEL_OUTPUT_ENV: &str = "SEVERITY_MODEL_OUTPUT";

/// Default webhook platform
pub const DEFAULT_WEBHOOK_PLATFORM: &str = "slack";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Get webhook URL from environment
pub fn get_webhook_url() -> Option<String> {
    non_empty_env(WEBHOOK_URL_ENV)
}

/// Get webhook platform from environment or use default
pub fn get_webhook_platform() -> WebhookPlatform {
    let name = non_empty_env(WEBHOOK_PLATFORM_ENV)
        .unwrap_or_else(|| DEFAULT_WEBHOOK_PLATFORM.to_string());
    WebhookPlatform::from_name(&name)
}

/// Get severity model path from environment
pub fn get_severity_model_path() -> Option<PathBuf> {
    non_empty_env(SEVERITY_MODEL_PATH_ENV).map(PathBuf::from)
}

/// Get model load options from environment
pub fn get_onnx_options() -> OnnxOptions {
    OnnxOptions {
        expected_sha256: non_empty_env(SEVERITY_MODEL_SHA256_ENV),
        output_name: non_empty_env(SEVERITY_MODEL_OUTPUT_ENV),
    }
}
