//! Alert Module - Score → Tier Classification
//!
//! ## Structure
//! - `types`: AlertTier (data only)
//! - `classifier`: classify() against versioned thresholds

pub mod types;
pub mod classifier;

pub use types::AlertTier;
pub use classifier::{classify, Classification};
