//! Feature Vector - aggregated summary of a detection batch
//!
//! Produced by the aggregator, consumed by the severity scorers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logic::detection::DamageClass;
use super::layout::MODEL_FEATURE_COUNT;

// ============================================================================
// CLASS COUNTS
// ============================================================================

/// Per-class detection counts.
///
/// Every class of [`DamageClass::ALL`] is always present as a key, zero or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassCounts(BTreeMap<DamageClass, u32>);

impl ClassCounts {
    pub fn new() -> Self {
        Self(DamageClass::ALL.iter().map(|c| (*c, 0)).collect())
    }

    pub fn increment(&mut self, class: DamageClass) {
        *self.0.entry(class).or_insert(0) += 1;
    }

    pub fn add(&mut self, class: DamageClass, n: u32) {
        *self.0.entry(class).or_insert(0) += n;
    }

    pub fn get(&self, class: DamageClass) -> u32 {
        self.0.get(&class).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DamageClass, u32)> + '_ {
        self.0.iter().map(|(c, n)| (*c, *n))
    }

    /// Add another set of counts into this one
    pub fn merge(&mut self, other: &ClassCounts) {
        for (class, n) in other.iter() {
            self.add(class, n);
        }
    }

    /// Most frequent class. Ties go to the lexicographically smallest label,
    /// so the result never depends on detection order.
    pub fn dominant(&self) -> Option<DamageClass> {
        self.iter()
            .filter(|(_, n)| *n > 0)
            .max_by(|(a, na), (b, nb)| na.cmp(nb).then_with(|| b.as_str().cmp(a.as_str())))
            .map(|(class, _)| class)
    }

    /// "rust: 2, dent: 1" style summary of the non-zero classes
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self.iter()
            .filter(|(_, n)| *n > 0)
            .map(|(c, n)| format!("{}: {}", c, n))
            .collect();
        if parts.is_empty() {
            "No damages detected.".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl Default for ClassCounts {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub detection_count: u32,
    /// Mean confidence, 0.0 when there are no detections
    pub average_confidence: f32,
    pub total_damage_area_ratio: f32,
    pub class_counts: ClassCounts,
    pub dominant_class: Option<DamageClass>,
}

impl FeatureVector {
    /// Defined zero-feature vector for an empty batch
    pub fn empty() -> Self {
        Self {
            detection_count: 0,
            average_confidence: 0.0,
            total_damage_area_ratio: 0.0,
            class_counts: ClassCounts::new(),
            dominant_class: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.detection_count == 0
    }

    /// Model input in `MODEL_FEATURE_LAYOUT` order
    pub fn model_input(&self) -> [f32; MODEL_FEATURE_COUNT] {
        [
            self.average_confidence,
            self.total_damage_area_ratio,
            self.detection_count as f32,
        ]
    }

    /// JSON form for structured logs
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "detection_count": self.detection_count,
            "average_confidence": self.average_confidence,
            "total_damage_area_ratio": self.total_damage_area_ratio,
            "class_counts": self.class_counts,
            "dominant_class": self.dominant_class,
        })
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::empty()
    }
}
