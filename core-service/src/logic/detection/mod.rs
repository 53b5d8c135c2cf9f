//! Detection Module
//!
//! Uniform representation of what the external object detector reports.
//! The detector itself lives outside this crate; this module only
//! normalizes its output.
//!
//! ## Structure
//! - `types`: DamageClass, BoundingBox, Detection
//! - `adapter`: RawDetection -> Detection normalization

pub mod types;
pub mod adapter;

pub use types::{BoundingBox, DamageClass, Detection, FrameGeometry};
pub use adapter::{normalize, normalize_batch, BboxFormat, RawDetection};
