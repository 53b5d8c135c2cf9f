//! Linear (count-weighted) scoring: `Σ weight[c] * class_counts[c]`

use std::collections::BTreeMap;

use crate::error::ModelError;
use crate::logic::config::{ScoringConfig, ScoringMode};
use crate::logic::detection::DamageClass;
use crate::logic::features::FeatureVector;
use super::scorer::{SeverityScore, SeverityScorer};

#[derive(Debug, Clone)]
pub struct LinearScorer {
    weights: BTreeMap<DamageClass, f32>,
}

impl LinearScorer {
    pub fn new(weights: BTreeMap<DamageClass, f32>) -> Self {
        Self { weights }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        let weights = DamageClass::ALL.iter()
            .map(|&class| (class, config.linear_weight(class)))
            .collect();
        Self { weights }
    }

    fn weight(&self, class: DamageClass) -> f32 {
        self.weights.get(&class).copied().unwrap_or(0.0)
    }
}

impl SeverityScorer for LinearScorer {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Linear
    }

    fn score(&self, features: &FeatureVector) -> Result<SeverityScore, ModelError> {
        let value = features.class_counts.iter()
            .map(|(class, count)| self.weight(class) * count as f32)
            .sum();

        Ok(SeverityScore {
            value,
            method: ScoringMode::Linear,
            base: None,
            class_weight: None,
            dominant_class: features.dominant_class,
        })
    }
}
