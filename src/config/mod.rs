//! Engine Configuration Module
//!
//! All tunable engine parameters as TOML values, replacing hardcoded
//! thresholds with operator-tunable ones. Every field has a default matching
//! the documented engine behavior, so a missing file means zero-change
//! behavior.
//!
//! ## Loading Order
//!
//! 1. `RIDEIQ_CONFIG` environment variable (path to TOML file)
//! 2. `rideiq.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The config is threaded explicitly into every stage that needs it — in
//! particular the seed reaches every randomized call as an argument, never as
//! a hidden process-wide default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::types::quality_thresholds;

/// Errors raised while loading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

/// Root engine configuration.
///
/// Load with `EngineConfig::load()` which searches:
/// 1. `$RIDEIQ_CONFIG` env var
/// 2. `./rideiq.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub quality: QualitySection,

    #[serde(default)]
    pub model: ModelSection,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine: EngineSection::default(),
            quality: QualitySection::default(),
            model: ModelSection::default(),
        }
    }
}

/// Global engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    /// Seed for every randomized operation (splits, bootstrap sampling).
    #[serde(default = "defaults::seed")]
    pub seed: u64,

    /// Per-test significance level. No multiple-comparison correction is
    /// applied across the catalog.
    #[serde(default = "defaults::alpha")]
    pub alpha: f64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            seed: defaults::seed(),
            alpha: defaults::alpha(),
        }
    }
}

/// Data quality pass parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualitySection {
    /// Missingness ratio above which a column is flagged for review instead
    /// of imputed.
    #[serde(default = "defaults::missing_flag_threshold")]
    pub missing_flag_threshold: f64,

    /// IQR multiplier for outlier bounds.
    #[serde(default = "defaults::iqr_multiplier")]
    pub iqr_multiplier: f64,
}

impl Default for QualitySection {
    fn default() -> Self {
        Self {
            missing_flag_threshold: defaults::missing_flag_threshold(),
            iqr_multiplier: defaults::iqr_multiplier(),
        }
    }
}

/// Model training parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSection {
    /// Trees per forest.
    #[serde(default = "defaults::n_estimators")]
    pub n_estimators: usize,

    /// Maximum tree depth.
    #[serde(default = "defaults::max_depth")]
    pub max_depth: usize,

    /// Held-out fraction for evaluation.
    #[serde(default = "defaults::test_fraction")]
    pub test_fraction: f64,

    /// Minimum rows (after target filtering) for a viable training run.
    #[serde(default = "defaults::min_training_rows")]
    pub min_training_rows: usize,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            n_estimators: defaults::n_estimators(),
            max_depth: defaults::max_depth(),
            test_fraction: defaults::test_fraction(),
            min_training_rows: defaults::min_training_rows(),
        }
    }
}

/// Default values, one function per field so serde defaults and
/// `Default` impls stay in sync.
mod defaults {
    use super::quality_thresholds;

    pub fn seed() -> u64 {
        42
    }
    pub fn alpha() -> f64 {
        quality_thresholds::SIGNIFICANCE_THRESHOLD
    }
    pub fn missing_flag_threshold() -> f64 {
        quality_thresholds::MISSING_FLAG_THRESHOLD
    }
    pub fn iqr_multiplier() -> f64 {
        quality_thresholds::IQR_MULTIPLIER
    }
    pub fn n_estimators() -> usize {
        100
    }
    pub fn max_depth() -> usize {
        10
    }
    pub fn test_fraction() -> f64 {
        0.2
    }
    pub fn min_training_rows() -> usize {
        200
    }
}

impl EngineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$RIDEIQ_CONFIG` environment variable
    /// 2. `./rideiq.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("RIDEIQ_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded engine config from RIDEIQ_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from RIDEIQ_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "RIDEIQ_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("rideiq.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded engine config from ./rideiq.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./rideiq.toml, using defaults");
                }
            }
        }

        info!("No rideiq.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate parameter ranges. A nonsensical config is a fatal load error,
    /// not something to silently clamp.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.engine.alpha) || self.engine.alpha == 0.0 {
            return Err(ConfigError::Validation(format!(
                "engine.alpha must be in (0, 1), got {}",
                self.engine.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.quality.missing_flag_threshold) {
            return Err(ConfigError::Validation(format!(
                "quality.missing_flag_threshold must be in [0, 1], got {}",
                self.quality.missing_flag_threshold
            )));
        }
        if self.quality.iqr_multiplier <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "quality.iqr_multiplier must be positive, got {}",
                self.quality.iqr_multiplier
            )));
        }
        if self.model.n_estimators == 0 {
            return Err(ConfigError::Validation(
                "model.n_estimators must be at least 1".to_string(),
            ));
        }
        if self.model.max_depth == 0 {
            return Err(ConfigError::Validation(
                "model.max_depth must be at least 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.model.test_fraction) || self.model.test_fraction == 0.0 {
            return Err(ConfigError::Validation(format!(
                "model.test_fraction must be in (0, 1), got {}",
                self.model.test_fraction
            )));
        }
        // A split needs at least a handful of rows on each side.
        if self.model.min_training_rows < 10 {
            return Err(ConfigError::Validation(format!(
                "model.min_training_rows must be at least 10, got {}",
                self.model.min_training_rows
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.seed, 42);
        assert_eq!(config.model.n_estimators, 100);
        assert_eq!(config.model.max_depth, 10);
        assert_eq!(config.model.min_training_rows, 200);
        assert!((config.model.test_fraction - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [engine]
            seed = 7

            [model]
            n_estimators = 25
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(config.engine.seed, 7);
        assert_eq!(config.model.n_estimators, 25);
        // Untouched sections keep defaults
        assert_eq!(config.model.max_depth, 10);
        assert!((config.quality.missing_flag_threshold - 0.30).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_alpha_rejected() {
        let mut config = EngineConfig::default();
        config.engine.alpha = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn zero_trees_rejected() {
        let mut config = EngineConfig::default();
        config.model.n_estimators = 0;
        assert!(config.validate().is_err());
    }
}
