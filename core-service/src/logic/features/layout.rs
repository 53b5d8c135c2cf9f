//! Feature Layout - Centralized Model Input Definition
//!
//! **This file controls the severity model input schema**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! A trained severity model is only valid for the layout it was trained on.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current model input layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Model input names in the exact order the model expects them
pub const MODEL_FEATURE_LAYOUT: &[&str] = &[
    "average_confidence",      // 0: mean detection confidence
    "total_damage_area_ratio", // 1: summed bbox area / frame area
    "detection_count",         // 2: number of detections
];

/// Must match MODEL_FEATURE_LAYOUT.len()
pub const MODEL_FEATURE_COUNT: usize = 3;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of version + feature names, used to detect mismatched models
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in MODEL_FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

/// Layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: MODEL_FEATURE_COUNT,
            feature_names: MODEL_FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMismatchError {
    pub expected_hash: u32,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected v{} (hash: {:08x}), model declares hash {:08x}",
            FEATURE_VERSION, self.expected_hash, self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate the layout hash a model artifact was trained against
pub fn validate_layout(model_hash: u32) -> Result<(), LayoutMismatchError> {
    let current = layout_hash();
    if model_hash != current {
        return Err(LayoutMismatchError {
            expected_hash: current,
            actual_hash: model_hash,
        });
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
