use std::fs;
use std::path::{Path, PathBuf};

use attendance_scan_core::presentation::domain::presentation_sink::HistoryRecord;
use attendance_scan_core::scanning::scan_config::{ConfigError, ScannerConfig, SuppressionMode};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub duplicate_timeout_ms: Option<u64>,
    pub session_once: bool,
    pub history_capacity: Option<usize>,
    pub target_fps: Option<u32>,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("AttendanceScan").join("config.json"))
}

/// Loads the explicit config file, or the per-user one when it exists.
/// Without either, defaults apply.
pub fn load_config(explicit: Option<&Path>) -> Result<ScannerConfig, ConfigError> {
    match explicit {
        Some(path) => ScannerConfig::from_json_file(path),
        None => match default_config_path() {
            Some(path) if path.is_file() => {
                log::debug!("Loading config from {}", path.display());
                ScannerConfig::from_json_file(&path)
            }
            _ => Ok(ScannerConfig::default()),
        },
    }
}

pub fn apply_overrides(
    mut config: ScannerConfig,
    overrides: &Overrides,
) -> Result<ScannerConfig, ConfigError> {
    if let Some(ms) = overrides.duplicate_timeout_ms {
        config.duplicate_timeout_ms = ms;
    }
    if overrides.session_once {
        config.suppression = SuppressionMode::SessionOnce;
    }
    if let Some(cap) = overrides.history_capacity {
        config.history_capacity = cap;
    }
    if let Some(fps) = overrides.target_fps {
        config.target_fps = fps;
    }
    config.validate()?;
    Ok(config)
}

/// Writes the check-in log as pretty JSON, newest entry first.
pub fn write_history(
    path: &Path,
    records: &[HistoryRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}
