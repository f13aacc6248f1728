//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sla_kpi::KpiConfig;
use sla_loader::ReloadPolicy;
use sla_persistence::WriterConfig;
use std::path::Path;

/// Default config path, used when neither `--config` nor `SLA_CONFIG` is set.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable holding the config path.
pub const CONFIG_ENV: &str = "SLA_CONFIG";

/// Snapshot loading configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Snapshot file read by `check` and `watch` when no path is given.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    /// Reject snapshots that break an invariant instead of serving them flagged.
    #[serde(default)]
    pub strict: bool,
}

fn default_snapshot_path() -> String {
    "data.js".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            strict: false,
        }
    }
}

impl LoaderConfig {
    pub fn policy(&self) -> ReloadPolicy {
        ReloadPolicy {
            strict: self.strict,
        }
    }
}

/// Watch loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between reload checks. Default: 30.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Only reload when the file's modification time changed since the last attempt.
    #[serde(default = "default_reload_on_change")]
    pub reload_on_change: bool,
    /// Write the Prometheus text exposition here after every reload
    /// (textfile collector). Disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_path: Option<String>,
}

fn default_interval_secs() -> u64 {
    30
}

fn default_reload_on_change() -> bool {
    true
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            reload_on_change: default_reload_on_change(),
            metrics_path: None,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub kpi: KpiConfig,
    #[serde(default)]
    pub writer: WriterConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config to use: CLI arg > `SLA_CONFIG` env var > default path.
    ///
    /// An explicitly named file must exist. A missing default file falls back
    /// to built-in defaults.
    pub fn resolve(cli_path: Option<String>) -> AppResult<(Self, Option<String>)> {
        let explicit = cli_path.or_else(|| std::env::var(CONFIG_ENV).ok());

        match explicit {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Ok((
                Self::from_file(DEFAULT_CONFIG_PATH)?,
                Some(DEFAULT_CONFIG_PATH.to_string()),
            )),
            None => Ok((Self::default(), None)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> AppResult<()> {
        self.kpi.validate().map_err(AppError::Config)?;

        if self.watch.interval_secs == 0 {
            return Err(AppError::Config(
                "watch.interval_secs must be at least 1".to_string(),
            ));
        }
        if self.writer.orders_limit == 0 {
            return Err(AppError::Config(
                "writer.orders_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
