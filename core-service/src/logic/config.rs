//! Scoring Configuration
//!
//! One versioned object holding everything that shapes a severity/alert
//! decision: thresholds, class weights, policy flags and the optional range
//! filter. Loaded once at startup, validated, then shared read-only.
//!
//! The version tag is stamped onto every report and notification.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logic::alert::AlertTier;
use crate::logic::detection::DamageClass;

/// Env var naming a JSON config file
pub const CONFIG_PATH_ENV: &str = "SCORING_CONFIG_PATH";
/// Env var selecting a preset when no file is given
pub const SCORING_MODE_ENV: &str = "SCORING_MODE";

// ============================================================================
// SCORING MODE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Weighted sum of class counts
    Linear,
    /// External model probability times dominant class weight
    ModelWeighted,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::Linear => "linear",
            ScoringMode::ModelWeighted => "model_weighted",
        }
    }
}

impl FromStr for ScoringMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(ScoringMode::Linear),
            "model" | "model_weighted" => Ok(ScoringMode::ModelWeighted),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

// ============================================================================
// THRESHOLDS / POLICY / RANGES
// ============================================================================

/// Ascending alert cut points (inclusive lower bounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub low: f32,
    pub medium: f32,
    pub high: f32,
}

impl AlertThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("low", self.low), ("medium", self.medium), ("high", self.high)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteThreshold { name });
            }
        }
        if !(self.low < self.medium && self.medium < self.high) {
            return Err(ConfigError::ThresholdsNotAscending {
                low: self.low,
                medium: self.medium,
                high: self.high,
            });
        }
        Ok(())
    }
}

/// Which computed tiers are actually sent out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub send_info: bool,
    pub send_warning: bool,
    pub send_critical: bool,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            send_info: false,
            send_warning: true,
            send_critical: true,
        }
    }
}

impl AlertPolicy {
    /// Policy flag for `tier`; NONE is never sent
    pub fn allows(&self, tier: AlertTier) -> bool {
        match tier {
            AlertTier::None => false,
            AlertTier::Info => self.send_info,
            AlertTier::Warning => self.send_warning,
            AlertTier::Critical => self.send_critical,
        }
    }
}

/// Open interval (min, max)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f32,
    pub max: f32,
}

impl ScoreRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Strictly inside, both ends excluded
    pub fn contains(&self, score: f32) -> bool {
        self.min < score && score < self.max
    }

    /// Per-label ranges of the deployed Slack notifier. Compared against
    /// per-detection severity (confidence × area ratio), not the batch score.
    pub fn reference_filter() -> BTreeMap<DamageClass, ScoreRange> {
        BTreeMap::from([
            (DamageClass::Dent, ScoreRange::new(0.0, 0.8)),
            (DamageClass::Rust, ScoreRange::new(0.0, 1.0)),
            (DamageClass::BrokenDoor, ScoreRange::new(0.0, 0.7)),
            (DamageClass::Leak, ScoreRange::new(0.0, 2.0)),
        ])
    }
}

// ============================================================================
// SCORING CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Audit tag, e.g. "v1.0.0"
    pub version: String,
    pub mode: ScoringMode,
    pub thresholds: AlertThresholds,
    /// Multipliers for the linear formula; every class must be listed
    pub linear_weights: BTreeMap<DamageClass, f32>,
    /// Multipliers for the dominant class in model mode; missing = 1.0
    #[serde(default)]
    pub class_weights: BTreeMap<DamageClass, f32>,
    #[serde(default)]
    pub policy: AlertPolicy,
    /// Per-class open intervals the raw score must fall in to notify
    #[serde(default)]
    pub range_filter: Option<BTreeMap<DamageClass, ScoreRange>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::linear()
    }
}

impl ScoringConfig {
    /// Count-weighted preset (image/video path)
    pub fn linear() -> Self {
        Self {
            version: "linear-v1.0.0".to_string(),
            mode: ScoringMode::Linear,
            thresholds: AlertThresholds { low: 1.0, medium: 2.0, high: 5.0 },
            linear_weights: BTreeMap::from([
                (DamageClass::Dent, 1.0),
                (DamageClass::Rust, 2.0),
                (DamageClass::BrokenDoor, 3.0),
                (DamageClass::Leak, 4.0),
            ]),
            class_weights: default_class_weights(),
            policy: AlertPolicy::default(),
            range_filter: None,
        }
    }

    /// Trained-model preset
    pub fn model_weighted() -> Self {
        Self {
            version: "v1.0.0".to_string(),
            mode: ScoringMode::ModelWeighted,
            thresholds: AlertThresholds { low: 0.447, medium: 0.588, high: 0.740 },
            ..Self::linear()
        }
    }

    pub fn preset(mode: ScoringMode) -> Self {
        match mode {
            ScoringMode::Linear => Self::linear(),
            ScoringMode::ModelWeighted => Self::model_weighted(),
        }
    }

    pub fn linear_weight(&self, class: DamageClass) -> f32 {
        self.linear_weights.get(&class).copied().unwrap_or(0.0)
    }

    pub fn class_weight(&self, class: DamageClass) -> f32 {
        self.class_weights.get(&class).copied().unwrap_or(1.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::MissingVersion);
        }

        self.thresholds.validate()?;

        for class in DamageClass::ALL {
            let weight = self.linear_weights.get(&class).copied().unwrap_or(f32::NAN);
            check_weight(class, weight)?;
        }
        for (class, weight) in &self.class_weights {
            check_weight(*class, *weight)?;
        }

        if let Some(ranges) = &self.range_filter {
            for (class, range) in ranges {
                if !(range.min.is_finite() && range.max.is_finite() && range.min < range.max) {
                    return Err(ConfigError::InvalidRange {
                        class: *class,
                        min: range.min,
                        max: range.max,
                    });
                }
            }
        }

        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ScoringConfig = serde_json::from_str(json)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config = Self::from_json(&content)?;
        log::info!(
            "Loaded scoring config {} ({}) from {}",
            config.version,
            config.mode.as_str(),
            path.display()
        );
        Ok(config)
    }

    /// File from `SCORING_CONFIG_PATH`, else the preset named by `SCORING_MODE`
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load_from_file(path);
        }

        let config = match std::env::var(SCORING_MODE_ENV) {
            Ok(mode) => Self::preset(mode.parse()?),
            Err(_) => Self::default(),
        };
        config.validate()?;
        log::info!("Using built-in scoring config {} ({})", config.version, config.mode.as_str());
        Ok(config)
    }
}

fn default_class_weights() -> BTreeMap<DamageClass, f32> {
    BTreeMap::from([
        (DamageClass::Dent, 1.0),
        (DamageClass::Rust, 1.2),
        (DamageClass::Leak, 1.5),
        (DamageClass::BrokenDoor, 1.7),
    ])
}

fn check_weight(class: DamageClass, weight: f32) -> Result<(), ConfigError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidWeight { class, weight })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_presets_are_valid() {
        assert!(ScoringConfig::linear().validate().is_ok());
        assert!(ScoringConfig::model_weighted().validate().is_ok());
        assert_eq!(ScoringConfig::default().mode, ScoringMode::Linear);
    }

    #[test]
    fn test_model_preset_values() {
        let config = ScoringConfig::model_weighted();
        assert_eq!(config.thresholds.medium, 0.588);
        assert_eq!(config.class_weight(DamageClass::BrokenDoor), 1.7);
        assert!(!config.policy.send_info);
    }

    #[test]
    fn test_rejects_non_ascending_thresholds() {
        let mut config = ScoringConfig::linear();
        config.thresholds = AlertThresholds { low: 2.0, medium: 2.0, high: 5.0 };
        assert!(matches!(config.validate(), Err(ConfigError::ThresholdsNotAscending { .. })));

        config.thresholds = AlertThresholds { low: 1.0, medium: f32::NAN, high: 5.0 };
        assert_eq!(config.validate(), Err(ConfigError::NonFiniteThreshold { name: "medium" }));
    }

    #[test]
    fn test_rejects_negative_or_missing_weights() {
        let mut config = ScoringConfig::linear();
        config.linear_weights.insert(DamageClass::Rust, -2.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWeight { .. })));

        let mut config = ScoringConfig::linear();
        config.linear_weights.remove(&DamageClass::Leak);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight { class: DamageClass::Leak, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_range() {
        let mut config = ScoringConfig::linear();
        config.range_filter = Some(BTreeMap::from([(DamageClass::Dent, ScoreRange::new(0.8, 0.0))]));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRange { .. })));
    }

    #[test]
    fn test_rejects_empty_version() {
        let mut config = ScoringConfig::linear();
        config.version = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::MissingVersion));
    }

    #[test]
    fn test_unknown_class_weight_defaults_to_one() {
        let mut config = ScoringConfig::model_weighted();
        config.class_weights.clear();
        assert_eq!(config.class_weight(DamageClass::Leak), 1.0);
    }

    #[test]
    fn test_range_is_open_interval() {
        let range = ScoreRange::new(0.0, 0.8);
        assert!(range.contains(0.5));
        assert!(!range.contains(0.0));
        assert!(!range.contains(0.8));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("model".parse::<ScoringMode>(), Ok(ScoringMode::ModelWeighted));
        assert_eq!("Linear".parse::<ScoringMode>(), Ok(ScoringMode::Linear));
        assert!("random".parse::<ScoringMode>().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let json = serde_json::to_string_pretty(&ScoringConfig::model_weighted()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = ScoringConfig::load_from_file(file.path()).unwrap();
        assert_eq!(loaded, ScoringConfig::model_weighted());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(ScoringConfig::load_from_file(file.path()), Err(ConfigError::Parse(_))));

        let missing = ScoringConfig::load_from_file("/definitely/not/here.json");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_from_json_with_range_filter() {
        let json = r#"{
            "version": "ranges-v1",
            "mode": "linear",
            "thresholds": {"low": 1.0, "medium": 3.0, "high": 6.0},
            "linear_weights": {"dent": 1, "rust": 2, "broken_door": 3, "leak": 4},
            "range_filter": {"dent": {"min": 0.0, "max": 0.8}}
        }"#;
        let config = ScoringConfig::from_json(json).unwrap();
        assert_eq!(config.policy, AlertPolicy::default());
        assert!(config.class_weights.is_empty());
        assert_eq!(config.range_filter.unwrap()[&DamageClass::Dent], ScoreRange::new(0.0, 0.8));
    }
}
