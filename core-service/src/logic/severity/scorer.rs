//! Severity Scorer
//!
//! One strategy per `ScoringMode`, picked once at startup from the config.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ModelError};
use crate::logic::config::{ScoringConfig, ScoringMode};
use crate::logic::detection::DamageClass;
use crate::logic::features::FeatureVector;
use crate::logic::model::SeverityModel;
use super::linear::LinearScorer;
use super::weighted::ModelWeightedScorer;

/// Score plus how it was computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityScore {
    /// Non-negative severity
    pub value: f32,
    pub method: ScoringMode,
    /// Raw model output (model-weighted only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<f32>,
    /// Multiplier applied to `base` (model-weighted only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_weight: Option<f32>,
    pub dominant_class: Option<DamageClass>,
}

impl SeverityScore {
    /// Defined result for an empty detection batch
    pub fn zero(method: ScoringMode) -> Self {
        Self {
            value: 0.0,
            method,
            base: None,
            class_weight: None,
            dominant_class: None,
        }
    }
}

/// Given a FeatureVector, return a non-negative score
pub trait SeverityScorer: Send + Sync {
    fn mode(&self) -> ScoringMode;

    fn score(&self, features: &FeatureVector) -> Result<SeverityScore, ModelError>;
}

/// Scorer for `config.mode`; model-weighted mode needs a severity model
pub fn build_scorer(
    config: &ScoringConfig,
    model: Option<Arc<dyn SeverityModel>>,
) -> Result<Arc<dyn SeverityScorer>, ConfigError> {
    let scorer: Arc<dyn SeverityScorer> = match config.mode {
        ScoringMode::Linear => Arc::new(LinearScorer::from_config(config)),
        ScoringMode::ModelWeighted => {
            let model = model.ok_or_else(|| {
                ConfigError::ModelMissing("model-weighted scoring requires a severity model".to_string())
            })?;
            Arc::new(ModelWeightedScorer::from_config(model, config))
        }
    };

    log::info!("Severity scorer: {} (config {})", config.mode.as_str(), config.version);
    Ok(scorer)
}
