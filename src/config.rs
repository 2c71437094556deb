//! Configuration management
//!
//! All tunables are loaded once at startup from a TOML file and are
//! read-only for the process lifetime. Missing sections and fields fall
//! back to defaults matching the original deployment: 80/80/90/80
//! thresholds, a 10 second tick, a 5 minute log window, and a 5 minute
//! notification rate limit.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable that overrides the configured transport credential
pub const CREDENTIAL_ENV_VAR: &str = "VIGIL_NOTIFY_CREDENTIAL";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub sampler: SamplerConfig,
    pub thresholds: ThresholdConfig,
    pub log_scan: LogScanConfig,
    pub notify: NotifyConfig,
}

/// Scheduling loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between monitoring ticks
    pub tick_interval_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_seconds: 10,
        }
    }
}

/// Metrics sampler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Mount point of the volume whose usage is monitored
    pub disk_path: String,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            disk_path: "/".to_string(),
        }
    }
}

/// Resource utilization limits
///
/// A metric alerts only when its value is strictly above the limit;
/// equality never triggers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub cpu_limit: f64,
    pub mem_limit: f64,
    pub disk_limit: f64,
    pub gpu_limit: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            cpu_limit: 80.0,
            mem_limit: 80.0,
            disk_limit: 90.0,
            gpu_limit: 80.0,
        }
    }
}

/// Log window scanner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogScanConfig {
    /// Trailing window within which records are considered, in seconds
    pub window_seconds: u64,
    /// Records per provider read
    pub page_size: usize,
    /// Patterns a line must match to become an alert
    pub include_keywords: Vec<String>,
    /// Patterns that veto a line even when an include pattern matches
    pub exclude_keywords: Vec<String>,
}

impl Default for LogScanConfig {
    fn default() -> Self {
        Self {
            window_seconds: 300,
            page_size: 64,
            include_keywords: vec![
                "error".to_string(),
                "fail".to_string(),
                "critical".to_string(),
            ],
            exclude_keywords: vec!["DCOM".to_string(), "DNS Client".to_string()],
        }
    }
}

/// Notification transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Minimum seconds between two notification dispatches
    pub interval_seconds: u64,
    /// Subject line for every notification
    pub subject: String,
    /// Transport endpoint URL
    pub endpoint: String,
    /// Sender identity presented to the transport
    pub sender: String,
    /// Recipient address
    pub recipient: String,
    /// Bearer credential for the transport; see [`CREDENTIAL_ENV_VAR`]
    pub credential: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            subject: "System status summary".to_string(),
            endpoint: String::new(),
            sender: String::new(),
            recipient: String::new(),
            credential: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML, and
    /// `ConfigError::ValidationError` if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the transport credential with the environment value when set
    ///
    /// Keeps the secret out of the config file for deployments that prefer
    /// environment-based credentials.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(credential) = env::var(CREDENTIAL_ENV_VAR) {
            self.notify.credential = credential;
        }
    }

    /// Check value ranges after parsing
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.tick_interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "tick_interval_seconds must be positive".to_string(),
            ));
        }
        if self.log_scan.window_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "window_seconds must be positive".to_string(),
            ));
        }
        if self.log_scan.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "page_size must be positive".to_string(),
            ));
        }
        if self.notify.interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "notify interval_seconds must be positive".to_string(),
            ));
        }

        let limits = [
            ("cpu_limit", self.thresholds.cpu_limit),
            ("mem_limit", self.thresholds.mem_limit),
            ("disk_limit", self.thresholds.disk_limit),
            ("gpu_limit", self.thresholds.gpu_limit),
        ];
        for (name, value) in limits {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be between 0 and 100, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
