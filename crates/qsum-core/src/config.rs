//! Solver configuration.
//!
//! Sources, highest precedence first:
//! 1. Environment variables (`QSUM_` prefix)
//! 2. Configuration file (YAML)
//! 3. Default values
//!
//! Command-line flags are applied on top by the CLI.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use tracing::warn;

use crate::counting::default_counting_qubits;
use crate::decoder::MeasurementDecoder;
use crate::instance::ProblemInstance;
use crate::layout::Encoding;
use crate::oracle::{OracleBuilder, oracle_for};

/// Widest counting register accepted; the circuit holds `2^t − 1` copies of `G`.
pub const MAX_COUNTING_QUBITS: u32 = 16;

/// Widest sum register accepted.
pub const MAX_SUM_WIDTH: u32 = 62;

/// Settings for one solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Oracle encoding.
    #[serde(default)]
    pub encoding: Encoding,

    /// Shots for the amplified search.
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Shots for the counting run.
    #[serde(default = "default_counting_shots")]
    pub counting_shots: u32,

    /// Counting register width; `N + 2` when unset.
    #[serde(default)]
    pub counting_qubits: Option<u32>,

    /// Sum register width; the minimum for the instance when unset.
    #[serde(default)]
    pub sum_width: Option<u32>,

    /// Peak selection thresholds.
    #[serde(default)]
    pub decoder: MeasurementDecoder,
}

fn default_shots() -> u32 {
    1024
}

fn default_counting_shots() -> u32 {
    512
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            shots: default_shots(),
            counting_shots: default_counting_shots(),
            counting_qubits: None,
            sum_width: None,
            decoder: MeasurementDecoder::default(),
        }
    }
}

impl SolverConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.as_ref().display())))?;

        let config: SolverConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// File (or defaults), then environment overrides, then validation.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `QSUM_*` environment variables.
    ///
    /// Only variables that are set override the current values.
    #[must_use]
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    #[must_use]
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = parsed(&lookup, "QSUM_ENCODING") {
            self.encoding = v;
        }
        if let Some(v) = parsed(&lookup, "QSUM_SHOTS") {
            self.shots = v;
        }
        if let Some(v) = parsed(&lookup, "QSUM_COUNTING_SHOTS") {
            self.counting_shots = v;
        }
        if let Some(v) = parsed(&lookup, "QSUM_COUNTING_QUBITS") {
            self.counting_qubits = Some(v);
        }
        if let Some(v) = parsed(&lookup, "QSUM_SUM_WIDTH") {
            self.sum_width = Some(v);
        }
        if let Some(v) = parsed(&lookup, "QSUM_BASELINE_FACTOR") {
            self.decoder.baseline_factor = v;
        }
        if let Some(v) = parsed(&lookup, "QSUM_PEAK_RATIO") {
            self.decoder.peak_ratio = v;
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shots == 0 {
            return Err(ConfigError::ValidationError(
                "shots must be greater than 0".to_string(),
            ));
        }
        if self.counting_shots == 0 {
            return Err(ConfigError::ValidationError(
                "counting_shots must be greater than 0".to_string(),
            ));
        }
        if let Some(t) = self.counting_qubits {
            if t == 0 || t > MAX_COUNTING_QUBITS {
                return Err(ConfigError::ValidationError(format!(
                    "counting_qubits must be between 1 and {MAX_COUNTING_QUBITS}, got {t}"
                )));
            }
        }
        if let Some(w) = self.sum_width {
            if w == 0 || w > MAX_SUM_WIDTH {
                return Err(ConfigError::ValidationError(format!(
                    "sum_width must be between 1 and {MAX_SUM_WIDTH}, got {w}"
                )));
            }
        }
        let factor = self.decoder.baseline_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "baseline_factor must be positive, got {factor}"
            )));
        }
        let ratio = self.decoder.peak_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "peak_ratio must be in (0, 1], got {ratio}"
            )));
        }
        Ok(())
    }

    /// Counting register width for `instance`.
    pub fn counting_qubits_for(&self, instance: &ProblemInstance) -> u32 {
        self.counting_qubits
            .unwrap_or_else(|| default_counting_qubits(instance.index_width()))
    }

    /// Oracle builder for the configured encoding and sum width.
    pub fn oracle_builder(&self) -> Box<dyn OracleBuilder> {
        oracle_for(self.encoding, self.sum_width)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.encoding, Encoding::Optimized);
        assert_eq!(config.shots, 1024);
        assert_eq!(config.counting_shots, 512);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_fills_defaults() {
        let config: SolverConfig =
            serde_yaml_ng::from_str("encoding: unoptimized\ncounting_qubits: 4\n").unwrap();
        assert_eq!(config.encoding, Encoding::Unoptimized);
        assert_eq!(config.counting_qubits, Some(4));
        assert_eq!(config.shots, 1024);
    }

    #[test]
    fn test_env_overrides() {
        let config = SolverConfig::default().merge_vars(vars(&[
            ("QSUM_SHOTS", "2048"),
            ("QSUM_ENCODING", "unoptimized"),
            ("QSUM_PEAK_RATIO", "0.3"),
        ]));
        assert_eq!(config.shots, 2048);
        assert_eq!(config.encoding, Encoding::Unoptimized);
        assert!((config.decoder.peak_ratio - 0.3).abs() < 1e-12);
        assert_eq!(config.counting_shots, 512);
    }

    #[test]
    fn test_unparseable_env_is_ignored() {
        let config = SolverConfig::default().merge_vars(vars(&[("QSUM_SHOTS", "many")]));
        assert_eq!(config.shots, 1024);
    }

    #[test]
    fn test_validate_rejects_zero_shots() {
        let config = SolverConfig {
            shots: 0,
            ..SolverConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_counting_width() {
        let mut config = SolverConfig::default();
        config.counting_qubits = Some(0);
        assert!(config.validate().is_err());
        config.counting_qubits = Some(MAX_COUNTING_QUBITS + 1);
        assert!(config.validate().is_err());
        config.counting_qubits = Some(6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_decoder_ranges() {
        let mut config = SolverConfig::default();
        config.decoder.peak_ratio = 1.5;
        assert!(config.validate().is_err());
        config.decoder.peak_ratio = 0.5;
        config.decoder.baseline_factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_counting_qubits_default_follows_instance() {
        let inst = ProblemInstance::new(vec![5, 7, 8, 9, 1], 16).unwrap();
        assert_eq!(SolverConfig::default().counting_qubits_for(&inst), 7);
    }

    #[test]
    fn test_missing_file() {
        let err = SolverConfig::from_file("/nonexistent/qsum.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
