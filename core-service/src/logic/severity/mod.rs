//! Severity Module - FeatureVector → Severity Score
//!
//! ## Structure
//! - `scorer`: SeverityScorer trait, SeverityScore breakdown, build_scorer()
//! - `linear`: Σ weight[c] * count[c]
//! - `weighted`: model base score × dominant-class weight

pub mod scorer;
pub mod linear;
pub mod weighted;

pub use scorer::{build_scorer, SeverityScore, SeverityScorer};
pub use linear::LinearScorer;
pub use weighted::ModelWeightedScorer;
