//! Recommendation Module - SOP Text
//!
//! The retrieval engine that produces standard-operating-procedure text is
//! an external collaborator behind [`Recommender`]. `SopRecommender` is the
//! built-in rule-based version used when no retrieval backend is wired in.
//! A failing recommender never fails an inspection.

use thiserror::Error;

use crate::logic::alert::AlertTier;
use crate::logic::detection::DamageClass;
use crate::logic::features::ClassCounts;

/// Used whenever the recommender fails
pub const NO_RECOMMENDATION: &str = "No SOP recommendation available.";

#[derive(Debug, Clone, PartialEq, Error)]
#[error("recommendation unavailable: {0}")]
pub struct RecommendError(pub String);

/// Produces SOP text for a classified inspection
pub trait Recommender: Send + Sync {
    fn name(&self) -> &str;

    fn recommend(&self, tier: AlertTier, counts: &ClassCounts) -> Result<String, RecommendError>;
}

/// Call `recommender`, degrading to [`NO_RECOMMENDATION`] on failure
pub fn recommend_or_fallback(recommender: &dyn Recommender, tier: AlertTier, counts: &ClassCounts) -> String {
    match recommender.recommend(tier, counts) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Recommender '{}' failed: {}", recommender.name(), e);
            NO_RECOMMENDATION.to_string()
        }
    }
}

// ============================================================================
// RULE-BASED SOP
// ============================================================================

/// Deterministic SOP text per tier, with a class-specific action line
#[derive(Debug, Default, Clone, Copy)]
pub struct SopRecommender;

impl SopRecommender {
    pub fn new() -> Self {
        Self
    }

    fn tier_guidance(tier: AlertTier) -> &'static str {
        match tier {
            AlertTier::Critical => {
                "Container is likely compromised. Hold the shipment and do not proceed \
                 until a full inspection or repair has been completed."
            }
            AlertTier::Warning => {
                "Assessment shows significant damage indicators. Manual inspection is \
                 required before making a shipping decision."
            }
            AlertTier::Info => {
                "Minor damage observed. Shipment may proceed under standard monitoring; \
                 log the findings for the next scheduled inspection."
            }
            AlertTier::None => {
                "No significant damage detected. Container may proceed with shipping."
            }
        }
    }

    fn class_action(class: DamageClass) -> &'static str {
        match class {
            DamageClass::Dent => "Check dented panels for structural deformation near corner posts.",
            DamageClass::Rust => "Inspect corroded areas for perforation and schedule surface treatment.",
            DamageClass::BrokenDoor => "Verify door seals and locking bars; secure or replace before loading.",
            DamageClass::Leak => "Isolate the container and check cargo for water or chemical exposure.",
        }
    }
}

impl Recommender for SopRecommender {
    fn name(&self) -> &str {
        "sop-rules"
    }

    fn recommend(&self, tier: AlertTier, counts: &ClassCounts) -> Result<String, RecommendError> {
        let guidance = Self::tier_guidance(tier);
        match (tier, counts.dominant()) {
            (AlertTier::None, _) | (_, None) => Ok(guidance.to_string()),
            (_, Some(class)) => Ok(format!("{} {}", guidance, Self::class_action(class))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl Recommender for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        fn recommend(&self, _tier: AlertTier, _counts: &ClassCounts) -> Result<String, RecommendError> {
            Err(RecommendError("index not loaded".to_string()))
        }
    }

    #[test]
    fn test_sop_text_per_tier() {
        let mut counts = ClassCounts::new();
        counts.add(DamageClass::Leak, 2);

        let critical = SopRecommender.recommend(AlertTier::Critical, &counts).unwrap();
        assert!(critical.starts_with("Container is likely compromised"));
        assert!(critical.contains("Isolate the container"));

        let none = SopRecommender.recommend(AlertTier::None, &counts).unwrap();
        assert_eq!(none, "No significant damage detected. Container may proceed with shipping.");
    }

    #[test]
    fn test_sop_is_deterministic() {
        let mut counts = ClassCounts::new();
        counts.add(DamageClass::Rust, 1);
        counts.add(DamageClass::Dent, 1);
        let a = SopRecommender.recommend(AlertTier::Warning, &counts).unwrap();
        let b = SopRecommender.recommend(AlertTier::Warning, &counts).unwrap();
        assert_eq!(a, b);
        // tie dent/rust resolves to dent
        assert!(a.contains("dented panels"));
    }

    #[test]
    fn test_failure_degrades_to_fallback() {
        let text = recommend_or_fallback(&Offline, AlertTier::Critical, &ClassCounts::new());
        assert_eq!(text, NO_RECOMMENDATION);
    }
}
