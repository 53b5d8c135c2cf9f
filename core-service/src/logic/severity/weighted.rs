//! Model-weighted scoring
//!
//! `severity = model.predict([avg_conf, area_ratio, count]) * class_weight[dominant]`.
//! An empty batch scores 0 without invoking the model.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ModelError;
use crate::logic::config::{ScoringConfig, ScoringMode};
use crate::logic::detection::DamageClass;
use crate::logic::features::FeatureVector;
use crate::logic::model::inference::check_output;
use crate::logic::model::SeverityModel;
use super::scorer::{SeverityScore, SeverityScorer};

/// Weight for classes without a configured multiplier
pub const DEFAULT_CLASS_WEIGHT: f32 = 1.0;

pub struct ModelWeightedScorer {
    model: Arc<dyn SeverityModel>,
    class_weights: BTreeMap<DamageClass, f32>,
}

impl ModelWeightedScorer {
    pub fn new(model: Arc<dyn SeverityModel>, class_weights: BTreeMap<DamageClass, f32>) -> Self {
        Self { model, class_weights }
    }

    pub fn from_config(model: Arc<dyn SeverityModel>, config: &ScoringConfig) -> Self {
        Self::new(model, config.class_weights.clone())
    }

    fn class_weight(&self, class: Option<DamageClass>) -> f32 {
        class.and_then(|c| self.class_weights.get(&c).copied())
            .unwrap_or(DEFAULT_CLASS_WEIGHT)
    }
}

impl SeverityScorer for ModelWeightedScorer {
    fn mode(&self) -> ScoringMode {
        ScoringMode::ModelWeighted
    }

    fn score(&self, features: &FeatureVector) -> Result<SeverityScore, ModelError> {
        if features.is_empty() {
            return Ok(SeverityScore::zero(ScoringMode::ModelWeighted));
        }

        let base = self.model.predict(&features.model_input())?;
        let class_weight = self.class_weight(features.dominant_class);
        let value = check_output(base * class_weight)?;

        log::debug!(
            "Model-weighted severity: base={:.4} weight={:.2} dominant={:?} → {:.4}",
            base, class_weight, features.dominant_class, value
        );

        Ok(SeverityScore {
            value,
            method: ScoringMode::ModelWeighted,
            base: Some(base),
            class_weight: Some(class_weight),
            dominant_class: features.dominant_class,
        })
    }
}
