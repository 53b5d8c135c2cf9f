//! Container damage severity scoring and alert decision pipeline
//!
//! Detector output goes in; a severity score, an alert tier, SOP text and a
//! notification decision come out. See `logic::pipeline::InspectionPipeline`.

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{ConfigError, DispatchError, InputError, InspectionError, ModelError, Stage};
pub use logic::alert::AlertTier;
pub use logic::config::{ScoringConfig, ScoringMode};
pub use logic::detection::{DamageClass, FrameGeometry, RawDetection};
pub use logic::features::FeatureVector;
pub use logic::pipeline::{ImageInspection, InspectionOutcome, InspectionPipeline, InspectionReport, VideoInspection};
pub use logic::startup::Runtime;
