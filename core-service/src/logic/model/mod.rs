//! Model Module - Severity Models & Registry
//!
//! Model handles are created once at startup and injected; no global session.

pub mod inference;
pub mod registry;

pub use inference::{
    load_severity_model, EngineStatus, LogisticSeverityModel, ModelMetadata, OnnxOptions,
    OnnxSeverityModel, SeverityModel,
};
pub use registry::{
    ModelDescriptor, ModelHandle, ModelKind, ModelRegistry, DAMAGE_DETECTOR, SEVERITY_MODEL,
    SOP_RECOMMENDER,
};
