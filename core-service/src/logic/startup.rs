//! Startup Wiring
//!
//! Builds the shared, read-only runtime once: scoring config, model
//! registry, scorer, recommender, notifier and dispatcher. Any error here is
//! fatal to the process.

use std::path::PathBuf;
use std::sync::Arc;

use crate::constants;
use crate::error::ConfigError;
use crate::logic::config::{ScoringConfig, ScoringMode};
use crate::logic::model::{
    load_severity_model, ModelHandle, ModelRegistry, OnnxOptions, SeverityModel, SEVERITY_MODEL, SOP_RECOMMENDER,
};
use crate::logic::notify::{LogNotifier, NotificationDispatcher, Notifier, WebhookConfig, WebhookNotifier};
use crate::logic::pipeline::InspectionPipeline;
use crate::logic::recommend::{Recommender, SopRecommender};
use crate::logic::severity::build_scorer;

/// Everything needed to build a [`Runtime`]
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub scoring: ScoringConfig,
    pub model_path: Option<PathBuf>,
    pub model_options: OnnxOptions,
    pub webhook: Option<WebhookConfig>,
}

impl EngineSettings {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self {
            scoring,
            model_path: None,
            model_options: OnnxOptions::default(),
            webhook: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let webhook = constants::get_webhook_url()
            .map(|url| WebhookConfig::new(url, constants::get_webhook_platform()));

        Ok(Self {
            scoring: ScoringConfig::from_env()?,
            model_path: constants::get_severity_model_path(),
            model_options: constants::get_onnx_options(),
            webhook,
        })
    }
}

/// Shared handles for the lifetime of the process
#[derive(Clone)]
pub struct Runtime {
    pub pipeline: Arc<InspectionPipeline>,
    pub registry: Arc<ModelRegistry>,
}

impl Runtime {
    pub fn build(settings: EngineSettings) -> Result<Self, ConfigError> {
        let EngineSettings { scoring, model_path, model_options, webhook } = settings;
        scoring.validate()?;

        let mut registry = ModelRegistry::new();

        let model: Option<Arc<dyn SeverityModel>> = match &model_path {
            Some(path) => {
                let model: Arc<dyn SeverityModel> = Arc::from(load_severity_model(path, &model_options)?);
                registry.insert(SEVERITY_MODEL, ModelHandle::Tabular(model.clone()));
                Some(model)
            }
            None => None,
        };
        if model.is_some() && scoring.mode == ScoringMode::Linear {
            log::info!("Severity model loaded but scoring mode is linear; model is listed only");
        }

        let recommender: Arc<dyn Recommender> = Arc::new(SopRecommender::new());
        registry.insert(SOP_RECOMMENDER, ModelHandle::Retrieval(recommender.clone()));

        let notifier: Arc<dyn Notifier> = match webhook {
            Some(config) => {
                log::info!("Notifications → {} webhook", config.platform.as_str());
                Arc::new(WebhookNotifier::new(config))
            }
            None => {
                log::warn!("No {} set - notifications will only be logged", constants::WEBHOOK_URL_ENV);
                Arc::new(LogNotifier)
            }
        };

        let scorer = build_scorer(&scoring, model)?;
        let dispatcher = Arc::new(NotificationDispatcher::new(notifier));
        let pipeline = InspectionPipeline::new(Arc::new(scoring), scorer, recommender, dispatcher);

        Ok(Self {
            pipeline: Arc::new(pipeline),
            registry: Arc::new(registry),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::build(EngineSettings::from_env()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout_hash;

    #[test]
    fn test_linear_runtime() {
        let runtime = Runtime::build(EngineSettings::new(ScoringConfig::linear())).unwrap();

        assert_eq!(runtime.pipeline.config().version, "linear-v1.0.0");
        assert!(runtime.registry.recommender(SOP_RECOMMENDER).is_some());
        assert!(runtime.registry.severity_model(SEVERITY_MODEL).is_none());
        assert_eq!(runtime.pipeline.dispatcher().stats().notifier, "log");
    }

    #[test]
    fn test_model_mode_without_model_fails() {
        let result = Runtime::build(EngineSettings::new(ScoringConfig::model_weighted()));
        assert!(matches!(result, Err(ConfigError::ModelMissing(_))));
    }

    #[test]
    fn test_model_mode_with_coefficient_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("severity.json");
        std::fs::write(
            &path,
            format!(r#"{{"coefficients": [1.2, 3.5, 0.1], "intercept": -1.5, "layout_hash": {}}}"#, layout_hash()),
        )
        .unwrap();

        let mut settings = EngineSettings::new(ScoringConfig::model_weighted());
        settings.model_path = Some(path);
        settings.webhook = Some(WebhookConfig::new("http://127.0.0.1:1/hook", crate::logic::notify::WebhookPlatform::Slack));

        let runtime = Runtime::build(settings).unwrap();
        assert!(runtime.registry.severity_model(SEVERITY_MODEL).is_some());
        assert_eq!(runtime.registry.len(), 2);
        assert_eq!(runtime.pipeline.dispatcher().stats().notifier, "slack");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut scoring = ScoringConfig::linear();
        scoring.version.clear();
        assert!(matches!(
            Runtime::build(EngineSettings::new(scoring)),
            Err(ConfigError::MissingVersion)
        ));
    }
}
