use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::domain::frame_source::{CaptureConstraints, FacingMode};
use crate::decoding::domain::code_decoder::{DecodeOptions, InversionMode};
use crate::scanning::suppression_store::SuppressionPolicy;
use crate::shared::constants::{
    DEFAULT_DUPLICATE_TIMEOUT_MS, DEFAULT_HISTORY_CAPACITY, DEFAULT_SETTLE_TIMEOUT_MS,
    DEFAULT_SWEEP_MULTIPLIER, DEFAULT_TARGET_FPS, MAX_DUPLICATE_TIMEOUT_MS,
    MAX_HISTORY_CAPACITY, MAX_SETTLE_TIMEOUT_MS, MAX_SWEEP_MULTIPLIER, MAX_TARGET_FPS,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionMode {
    #[default]
    Windowed,
    SessionOnce,
}

/// Tunables for one scanning session. Every field has a default, so a
/// partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub duplicate_timeout_ms: u64,
    pub sweep_multiplier: u32,
    pub suppression: SuppressionMode,
    pub history_capacity: usize,
    pub inversion: InversionMode,
    pub facing_mode: FacingMode,
    pub target_fps: u32,
    pub settle_timeout_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            duplicate_timeout_ms: DEFAULT_DUPLICATE_TIMEOUT_MS,
            sweep_multiplier: DEFAULT_SWEEP_MULTIPLIER,
            suppression: SuppressionMode::Windowed,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            inversion: InversionMode::AttemptBoth,
            facing_mode: FacingMode::Environment,
            target_fps: DEFAULT_TARGET_FPS,
            settle_timeout_ms: DEFAULT_SETTLE_TIMEOUT_MS,
        }
    }
}

impl ScannerConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "duplicate_timeout_ms",
            self.duplicate_timeout_ms,
            1,
            MAX_DUPLICATE_TIMEOUT_MS,
        )?;
        check_range(
            "sweep_multiplier",
            self.sweep_multiplier.into(),
            1,
            MAX_SWEEP_MULTIPLIER.into(),
        )?;
        check_range(
            "history_capacity",
            self.history_capacity as u64,
            1,
            MAX_HISTORY_CAPACITY as u64,
        )?;
        check_range("target_fps", self.target_fps.into(), 1, MAX_TARGET_FPS.into())?;
        check_range(
            "settle_timeout_ms",
            self.settle_timeout_ms,
            0,
            MAX_SETTLE_TIMEOUT_MS,
        )?;
        Ok(())
    }

    pub fn duplicate_timeout(&self) -> Duration {
        Duration::from_millis(self.duplicate_timeout_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }

    pub fn suppression_policy(&self) -> SuppressionPolicy {
        match self.suppression {
            SuppressionMode::Windowed => SuppressionPolicy::Windowed {
                timeout: self.duplicate_timeout(),
                sweep_multiplier: self.sweep_multiplier,
            },
            SuppressionMode::SessionOnce => SuppressionPolicy::SessionOnce,
        }
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            inversion: self.inversion,
        }
    }

    pub fn capture_constraints(&self) -> CaptureConstraints {
        CaptureConstraints {
            facing_mode: self.facing_mode,
            ideal_resolution: None,
        }
    }
}

fn check_range(name: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be between {min} and {max}, got {value}"
        )))
    }
}
