//! Model Registry
//!
//! Every external model the pipeline talks to, built once at startup and
//! shared read-only. Kinds are a closed variant over capability traits.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::logic::recommend::Recommender;
use crate::logic::video::DamageDetector;
use super::inference::{EngineStatus, SeverityModel};

/// Registry key of the severity regressor
pub const SEVERITY_MODEL: &str = "severity";
/// Registry key of the object detector
pub const DAMAGE_DETECTOR: &str = "detector";
/// Registry key of the SOP recommender
pub const SOP_RECOMMENDER: &str = "sop";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Tabular,
    Vision,
    Retrieval,
}

/// One loaded model
#[derive(Clone)]
pub enum ModelHandle {
    /// Severity regressor over the feature projection
    Tabular(Arc<dyn SeverityModel>),
    /// Damage object detector
    Vision(Arc<dyn DamageDetector>),
    /// SOP retrieval / recommendation
    Retrieval(Arc<dyn Recommender>),
}

impl ModelHandle {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelHandle::Tabular(_) => ModelKind::Tabular,
            ModelHandle::Vision(_) => ModelKind::Vision,
            ModelHandle::Retrieval(_) => ModelKind::Retrieval,
        }
    }
}

/// Listing entry for the models endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub key: String,
    pub kind: ModelKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EngineStatus>,
}

#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelHandle>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, handle: ModelHandle) {
        let key = key.into();
        log::info!("Registered {:?} model '{}'", handle.kind(), key);
        self.models.insert(key, handle);
    }

    pub fn with_tabular(mut self, key: impl Into<String>, model: Arc<dyn SeverityModel>) -> Self {
        self.insert(key, ModelHandle::Tabular(model));
        self
    }

    pub fn with_vision(mut self, key: impl Into<String>, detector: Arc<dyn DamageDetector>) -> Self {
        self.insert(key, ModelHandle::Vision(detector));
        self
    }

    pub fn with_retrieval(mut self, key: impl Into<String>, recommender: Arc<dyn Recommender>) -> Self {
        self.insert(key, ModelHandle::Retrieval(recommender));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ModelHandle> {
        self.models.get(key)
    }

    pub fn severity_model(&self, key: &str) -> Option<Arc<dyn SeverityModel>> {
        match self.models.get(key) {
            Some(ModelHandle::Tabular(model)) => Some(model.clone()),
            _ => None,
        }
    }

    pub fn detector(&self, key: &str) -> Option<Arc<dyn DamageDetector>> {
        match self.models.get(key) {
            Some(ModelHandle::Vision(detector)) => Some(detector.clone()),
            _ => None,
        }
    }

    pub fn recommender(&self, key: &str) -> Option<Arc<dyn Recommender>> {
        match self.models.get(key) {
            Some(ModelHandle::Retrieval(recommender)) => Some(recommender.clone()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Sorted by key
    pub fn describe(&self) -> Vec<ModelDescriptor> {
        self.models.iter()
            .map(|(key, handle)| {
                let (name, status) = match handle {
                    ModelHandle::Tabular(model) => (model.name().to_string(), Some(model.status())),
                    ModelHandle::Vision(_) => ("external-detector".to_string(), None),
                    ModelHandle::Retrieval(recommender) => (recommender.name().to_string(), None),
                };
                ModelDescriptor { key: key.clone(), kind: handle.kind(), name, status }
            })
            .collect()
    }
}
