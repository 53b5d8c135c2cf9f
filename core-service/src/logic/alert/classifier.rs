//! Alert Classifier
//!
//! Pure threshold lookup with inclusive lower bounds:
//! `>= high` → CRITICAL, `>= medium` → WARNING, `>= low` → INFO, else NONE.

use serde::{Deserialize, Serialize};

use crate::logic::config::AlertThresholds;
use super::types::AlertTier;

/// Tier plus the threshold set version that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub score: f32,
    pub tier: AlertTier,
    pub threshold_version: String,
}

/// Thresholds are assumed validated (finite, strictly ascending)
pub fn classify(score: f32, thresholds: &AlertThresholds) -> AlertTier {
    if score >= thresholds.high {
        AlertTier::Critical
    } else if score >= thresholds.medium {
        AlertTier::Warning
    } else if score >= thresholds.low {
        AlertTier::Info
    } else {
        AlertTier::None
    }
}

impl Classification {
    pub fn new(score: f32, thresholds: &AlertThresholds, version: &str) -> Self {
        Self {
            score,
            tier: classify(score, thresholds),
            threshold_version: version.to_string(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::config::ScoringConfig;

    fn model_thresholds() -> AlertThresholds {
        ScoringConfig::model_weighted().thresholds
    }

    fn one_ulp_below(x: f32) -> f32 {
        f32::from_bits(x.to_bits() - 1)
    }

    #[test]
    fn test_model_weighted_tiers() {
        let t = model_thresholds();
        assert_eq!(classify(0.0, &t), AlertTier::None);
        assert_eq!(classify(0.30, &t), AlertTier::None);
        assert_eq!(classify(0.50, &t), AlertTier::Info);
        assert_eq!(classify(0.60, &t), AlertTier::Warning);
        assert_eq!(classify(0.90, &t), AlertTier::Critical);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let t = model_thresholds();
        assert_eq!(classify(0.588, &t), AlertTier::Warning);
        assert_eq!(classify(one_ulp_below(0.588), &t), AlertTier::Info);
        assert_eq!(classify(t.low, &t), AlertTier::Info);
        assert_eq!(classify(one_ulp_below(t.low), &t), AlertTier::None);
        assert_eq!(classify(t.high, &t), AlertTier::Critical);
        assert_eq!(classify(one_ulp_below(t.high), &t), AlertTier::Warning);
    }

    #[test]
    fn test_linear_scenario_is_warning() {
        let t = ScoringConfig::linear().thresholds;
        assert_eq!(classify(4.0, &t), AlertTier::Warning);
        assert_eq!(classify(5.0, &t), AlertTier::Critical);
        assert_eq!(classify(0.0, &t), AlertTier::None);
    }

    #[test]
    fn test_classify_idempotent_and_monotone() {
        let t = model_thresholds();
        let mut previous = AlertTier::None;
        for i in 0..=200 {
            let score = i as f32 / 200.0;
            let tier = classify(score, &t);
            assert_eq!(tier, classify(score, &t));
            assert!(tier >= previous);
            previous = tier;
        }
    }

    #[test]
    fn test_classification_carries_version() {
        let config = ScoringConfig::model_weighted();
        let c = Classification::new(0.74, &config.thresholds, &config.version);
        assert_eq!(c.tier, AlertTier::Critical);
        assert_eq!(c.threshold_version, "v1.0.0");
    }
}
