//! Logic Module - Inspection Engines
//!
//! Leaf-first:
//! - `detection/` - detector records → typed detections
//! - `features/` - detections → FeatureVector
//! - `model/` - severity model backends, registry
//! - `severity/` - FeatureVector → severity score
//! - `alert/` - score → tier
//! - `recommend` - SOP text
//! - `notify/` - gate, notifiers, dispatcher
//! - `video/` - frame accumulation
//! - `pipeline/` - orchestration
//! - `config`, `startup` - versioned scoring config, env wiring

pub mod config;
pub mod detection;
pub mod features;
pub mod model;
pub mod severity;
pub mod alert;
pub mod recommend;
pub mod notify;
pub mod video;
pub mod pipeline;
pub mod startup;
