//! Inference Engine - Severity Model Backends
//!
//! A severity model maps the 3-feature projection
//! `[average_confidence, total_damage_area_ratio, detection_count]`
//! to a non-negative base score. Two backends:
//! - `LogisticSeverityModel`: exported logistic-regression coefficients (JSON)
//! - `OnnxSeverityModel`: ONNX Runtime session
//!
//! Handles are built once at startup and shared via `Arc`; nothing global.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ConfigError, ModelError};
use crate::logic::features::{layout_hash, MODEL_FEATURE_COUNT};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Engine status for the models endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_name: String,
    pub inference_device: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

/// Model metadata captured at load time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String,
    pub features: usize,
    pub layout_hash: u32,
    pub sha256: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Per-handle latency counters
#[derive(Debug, Default)]
pub struct LatencyStats {
    sum_us: AtomicU64,
    count: AtomicU64,
}

impl LatencyStats {
    pub fn record(&self, elapsed_us: u64) {
        self.sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn avg_latency_ms(&self) -> f32 {
        let sum = self.sum_us.load(Ordering::Relaxed);
        let count = self.count();
        if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 }
    }
}

// ============================================================================
// MODEL TRAIT
// ============================================================================

/// Trained severity model (tabular regressor over the feature projection)
pub trait SeverityModel: Send + Sync {
    fn name(&self) -> &str;

    /// Base score for one feature projection; must be finite and >= 0
    fn predict(&self, features: &[f32; MODEL_FEATURE_COUNT]) -> Result<f32, ModelError>;

    fn status(&self) -> EngineStatus;
}

/// Reject NaN, infinite or negative model output
pub fn check_output(value: f32) -> Result<f32, ModelError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ModelError::InvalidOutput(value))
    }
}

// ============================================================================
// LOGISTIC IMPLEMENTATION
// ============================================================================

/// Logistic regression: `sigmoid(intercept + Σ coefficients[i] * x[i])`
#[derive(Debug, Serialize, Deserialize)]
pub struct LogisticSeverityModel {
    pub coefficients: [f32; MODEL_FEATURE_COUNT],
    pub intercept: f32,
    /// Must equal the current feature layout hash when present
    #[serde(default)]
    pub layout_hash: Option<u32>,
    #[serde(skip)]
    stats: LatencyStats,
}

impl LogisticSeverityModel {
    pub fn new(coefficients: [f32; MODEL_FEATURE_COUNT], intercept: f32) -> Self {
        Self {
            coefficients,
            intercept,
            layout_hash: Some(layout_hash()),
            stats: LatencyStats::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::ModelLoad(format!("invalid coefficient file: {}", e)))?;

        if let Some(hash) = model.layout_hash {
            crate::logic::features::layout::validate_layout(hash)
                .map_err(|e| ConfigError::ModelLoad(e.to_string()))?;
        }
        if model.coefficients.iter().chain(std::iter::once(&model.intercept)).any(|c| !c.is_finite()) {
            return Err(ConfigError::ModelLoad("coefficients must be finite".to_string()));
        }

        Ok(model)
    }

    fn linear_term(&self, features: &[f32; MODEL_FEATURE_COUNT]) -> f32 {
        self.coefficients.iter()
            .zip(features.iter())
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }
}

impl SeverityModel for LogisticSeverityModel {
    fn name(&self) -> &str {
        "logistic"
    }

    fn predict(&self, features: &[f32; MODEL_FEATURE_COUNT]) -> Result<f32, ModelError> {
        let start_time = std::time::Instant::now();

        if features.iter().any(|x| !x.is_finite()) {
            return Err(ModelError::Inference("non-finite feature value".to_string()));
        }
        let z = self.linear_term(features);
        let score = 1.0 / (1.0 + (-z).exp());

        self.stats.record(start_time.elapsed().as_micros() as u64);
        check_output(score)
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            model_loaded: true,
            model_name: self.name().to_string(),
            inference_device: "CPU (closed form)".to_string(),
            avg_latency_ms: self.stats.avg_latency_ms(),
            inference_count: self.stats.count(),
        }
    }
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// Load-time options for an ONNX artifact
#[derive(Debug, Clone, Default)]
pub struct OnnxOptions {
    /// Hex SHA-256 the artifact must match
    pub expected_sha256: Option<String>,
    /// Output tensor to read; first declared output when `None`
    pub output_name: Option<String>,
}

/// ONNX Runtime session behind a mutex (`Session::run` takes `&mut self`)
pub struct OnnxSeverityModel {
    session: Mutex<Session>,
    output_name: String,
    metadata: ModelMetadata,
    stats: LatencyStats,
}

impl OnnxSeverityModel {
    pub fn load(model_path: &Path, options: &OnnxOptions) -> Result<Self, ConfigError> {
        log::info!("Loading ONNX severity model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ConfigError::ModelMissing(model_path.display().to_string()));
        }

        let bytes = std::fs::read(model_path).map_err(|e| ConfigError::Io {
            path: model_path.display().to_string(),
            message: e.to_string(),
        })?;
        let sha256 = verify_checksum(&bytes, options.expected_sha256.as_deref())?;

        let session = Session::builder()
            .map_err(|e| ConfigError::ModelLoad(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ConfigError::ModelLoad(format!("Failed to set optimization: {}", e)))?
            .commit_from_memory(&bytes)
            .map_err(|e| ConfigError::ModelLoad(format!("Failed to load model: {}", e)))?;

        let output_name = match &options.output_name {
            Some(name) => {
                if !session.outputs.iter().any(|o| &o.name == name) {
                    return Err(ConfigError::ModelLoad(format!("Model has no output named '{}'", name)));
                }
                name.clone()
            }
            None => session.outputs.first()
                .map(|o| o.name.clone())
                .ok_or_else(|| ConfigError::ModelLoad("No output defined".to_string()))?,
        };

        log::info!("ONNX severity model loaded (output: {}, sha256: {})", output_name, sha256);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            metadata: ModelMetadata {
                model_path: model_path.display().to_string(),
                model_type: "onnx".to_string(),
                features: MODEL_FEATURE_COUNT,
                layout_hash: layout_hash(),
                sha256,
                loaded_at: chrono::Utc::now(),
            },
            stats: LatencyStats::default(),
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl SeverityModel for OnnxSeverityModel {
    fn name(&self) -> &str {
        &self.metadata.model_path
    }

    fn predict(&self, features: &[f32; MODEL_FEATURE_COUNT]) -> Result<f32, ModelError> {
        let start_time = std::time::Instant::now();

        let input_array = Array2::<f32>::from_shape_vec((1, MODEL_FEATURE_COUNT), features.to_vec())
            .map_err(|e| ModelError::Inference(format!("Array error: {}", e)))?;
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ModelError::Inference(format!("Tensor error: {}", e)))?;

        let score = {
            let mut session = self.session.lock();
            let outputs = session.run(ort::inputs![input_tensor])
                .map_err(|e| ModelError::Inference(format!("Inference failed: {}", e)))?;

            let output = outputs.get(&self.output_name)
                .ok_or_else(|| ModelError::Inference("No output".to_string()))?;
            let output_tensor = output.try_extract_tensor::<f32>()
                .map_err(|e| ModelError::Inference(format!("Extract error: {}", e)))?;

            output_tensor.1.first()
                .copied()
                .ok_or_else(|| ModelError::Inference("Empty output tensor".to_string()))?
        };

        self.stats.record(start_time.elapsed().as_micros() as u64);
        check_output(score)
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            model_loaded: true,
            model_name: self.metadata.model_path.clone(),
            inference_device: "ONNX Runtime (CPU)".to_string(),
            avg_latency_ms: self.stats.avg_latency_ms(),
            inference_count: self.stats.count(),
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Hex SHA-256 of `bytes`, checked against `expected` when given
pub fn verify_checksum(bytes: &[u8], expected: Option<&str>) -> Result<String, ConfigError> {
    let actual = hex::encode(Sha256::digest(bytes));
    match expected {
        Some(expected) if !expected.eq_ignore_ascii_case(&actual) => Err(ConfigError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        }),
        _ => Ok(actual),
    }
}

/// `.onnx` → ONNX Runtime, `.json` → logistic coefficients
pub fn load_severity_model(path: &Path, options: &OnnxOptions) -> Result<Box<dyn SeverityModel>, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("onnx") => Ok(Box::new(OnnxSeverityModel::load(path, options)?)),
        Some("json") => {
            let bytes = std::fs::read(path).map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            verify_checksum(&bytes, options.expected_sha256.as_deref())?;
            let json = String::from_utf8(bytes).map_err(|e| ConfigError::ModelLoad(e.to_string()))?;
            log::info!("Loaded logistic severity model from: {}", path.display());
            Ok(Box::new(LogisticSeverityModel::from_json(&json)?))
        }
        _ => Err(ConfigError::ModelLoad(format!(
            "unsupported model format: {} (expected .onnx or .json)",
            path.display()
        ))),
    }
}

// ============================================================================
// TESTS
// ============================================================================
