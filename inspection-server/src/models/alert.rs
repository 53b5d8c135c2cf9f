//! Alert classification models

use serde::{Deserialize, Serialize};

use damage_core::AlertTier;

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub score: f32,
    pub tier: AlertTier,
    pub threshold_version: String,
    /// Whether the policy flag for this tier is on
    pub notify: bool,
}
