//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CaptureError, CaptureResult};
use crate::timing::WaitPolicy;

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default capture settings.
    pub capture: CaptureDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default capture parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Ask the compositor to drop the yellow capture border.
    pub hide_border: bool,

    /// Leave the mouse cursor out of the frame.
    pub hide_cursor: bool,

    /// How long to wait for the first frame (milliseconds).
    pub timeout_ms: u64,

    /// How often the waiter drains the message queue (milliseconds).
    pub poll_interval_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "primeshot=debug,warn", "off").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            hide_border: true,
            hide_cursor: true,
            timeout_ms: 10_000,
            poll_interval_ms: 50,
        }
    }
}

impl CaptureDefaults {
    /// Wait policy derived from the configured timeout and poll interval.
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_millis(self.timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// A configuration that emits nothing.
    pub fn silent() -> Self {
        Self {
            level: "off".to_string(),
            ..Self::default()
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", config_file_path(), e);
                Self::default()
            }
        }
    }

    /// Load config from the standard location. `Ok(None)` when there is no
    /// config file.
    ///
    /// Unlike [`AppConfig::load`] this logs nothing, so callers that set up
    /// logging from the config can report the error afterwards.
    pub fn try_load() -> CaptureResult<Option<Self>> {
        Self::try_load_from(&config_file_path())
    }

    /// Load config from an explicit path. `Ok(None)` when the file is missing.
    pub fn try_load_from(path: &Path) -> CaptureResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(path).map(Some)
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> CaptureResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CaptureError::config(format!("{}: {e}", path.display())))
    }

    /// Save config to the standard location.
    pub fn save(&self) -> CaptureResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> CaptureResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    config_base_dir().join("primeshot").join("config.json")
}

fn config_base_dir() -> PathBuf {
    if cfg!(windows) {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME")
                .or_else(|_| std::env::var("USERPROFILE"))
                .unwrap_or_else(|_| std::env::temp_dir().to_string_lossy().into_owned());
            PathBuf::from(home).join(".config")
        })
}
