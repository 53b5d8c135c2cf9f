//! Features Module - Feature Aggregation Engine
//!
//! Turns normalized detections into the scalar features the scorers use:
//! counts per class, average confidence, total damage area ratio.

pub mod layout;
pub mod vector;
pub mod aggregator;

#[cfg(test)]
mod tests;

pub use aggregator::{aggregate, dominant_class, validate_frame_area, FeatureAccumulator, RangeSample};
pub use layout::{layout_hash, LayoutInfo, MODEL_FEATURE_COUNT, MODEL_FEATURE_LAYOUT};
pub use vector::{ClassCounts, FeatureVector};
