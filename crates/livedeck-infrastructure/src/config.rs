//! Application configuration.
//!
//! Loaded from `~/.config/livedeck/config.toml`. Every section and field is
//! optional; a missing file yields the defaults. Environment variables
//! override the file:
//!
//! - `LIVEDECK_BASE_URL` - producer service base URL
//! - `LIVEDECK_LOG_CAPACITY` - number of interaction entries kept on screen
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:5000"
//!
//! [producer]
//! interval = 1.0
//! count = 999999
//!
//! [alerts]
//! poll_interval_secs = 2
//! rotate_interval_secs = 5
//!
//! [reconnect]
//! enabled = true
//! initial_backoff_ms = 500
//! max_backoff_ms = 30000
//! ```

use livedeck_core::alert::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_ROTATE_INTERVAL_SECS};
use livedeck_core::fragment::DEFAULT_ACCUMULATOR_CAPACITY;
use livedeck_core::interaction::DEFAULT_LOG_CAPACITY;
use livedeck_core::{ControlParams, DashboardSettings, LivedeckError, ReconnectPolicy, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::paths::LivedeckPaths;

pub const ENV_BASE_URL: &str = "LIVEDECK_BASE_URL";
pub const ENV_LOG_CAPACITY: &str = "LIVEDECK_LOG_CAPACITY";

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivedeckConfig {
    pub server: ServerConfig,
    pub producer: ProducerConfig,
    pub dashboard: DashboardConfig,
    pub alerts: AlertConfig,
    pub reconnect: ReconnectPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    /// Timeout for control calls and alert polls. The event stream has none.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// Seconds between produced interactions.
    pub interval: f64,
    pub count: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        let params = ControlParams::default();
        Self {
            interval: params.poll_interval,
            count: params.batch_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub log_capacity: usize,
    pub accumulator_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            accumulator_capacity: DEFAULT_ACCUMULATOR_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub poll_interval_secs: u64,
    pub rotate_interval_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            rotate_interval_secs: DEFAULT_ROTATE_INTERVAL_SECS,
        }
    }
}

impl AlertConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn rotate_interval(&self) -> Duration {
        Duration::from_secs(self.rotate_interval_secs)
    }
}

impl LivedeckConfig {
    /// Loads the config from the default location and applies environment overrides.
    pub fn load() -> Result<Self> {
        let path = LivedeckPaths::config_file()
            .map_err(|e| LivedeckError::config(e.to_string()))?;
        let mut config = Self::load_from(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config from `path`. A missing or empty file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("[Config] No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            LivedeckError::config(format!("Failed to read config file at {:?}: {}", path, e))
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        toml::from_str(&content).map_err(|e| {
            LivedeckError::config(format!("Failed to parse TOML from {:?}: {}", path, e))
        })
    }

    /// Applies overrides from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.server.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_LOG_CAPACITY) {
            self.dashboard.log_capacity = raw.trim().parse().map_err(|_| {
                LivedeckError::config(format!("{ENV_LOG_CAPACITY} must be a positive integer, got '{raw}'"))
            })?;
        }
        Ok(())
    }

    /// Rejects values the runtime cannot work with.
    pub fn validate(&self) -> Result<()> {
        let url = self.server.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LivedeckError::config(format!(
                "server.base_url must be an http(s) URL, got '{url}'"
            )));
        }
        if self.dashboard.log_capacity == 0 {
            return Err(LivedeckError::config("dashboard.log_capacity must be at least 1"));
        }
        if self.dashboard.accumulator_capacity == 0 {
            return Err(LivedeckError::config(
                "dashboard.accumulator_capacity must be at least 1",
            ));
        }
        if self.alerts.poll_interval_secs == 0 || self.alerts.rotate_interval_secs == 0 {
            return Err(LivedeckError::config("alert intervals must be at least 1 second"));
        }
        if !(self.producer.interval.is_finite() && self.producer.interval > 0.0) {
            return Err(LivedeckError::config("producer.interval must be positive"));
        }
        Ok(())
    }

    pub fn control_params(&self) -> ControlParams {
        ControlParams {
            poll_interval: self.producer.interval,
            batch_count: self.producer.count,
        }
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            log_capacity: self.dashboard.log_capacity,
            accumulator_capacity: self.dashboard.accumulator_capacity,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = LivedeckConfig::load_from(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, LivedeckConfig::default());
        assert_eq!(config.server.base_url, "http://localhost:5000");
        assert_eq!(config.dashboard.log_capacity, 8);
        assert_eq!(config.control_params().batch_count, 999_999);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
base_url = "http://live.local:8080"

[reconnect]
enabled = false
"#,
        )
        .unwrap();

        let config = LivedeckConfig::load_from(&path).unwrap();
        assert_eq!(config.server.base_url, "http://live.local:8080");
        assert_eq!(config.server.request_timeout_secs, 10);
        assert!(!config.reconnect.enabled);
        assert_eq!(config.reconnect.initial_backoff_ms, 500);
        assert_eq!(config.alerts.rotate_interval(), Duration::from_secs(5));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[server\nbase_url = ").unwrap();

        let err = LivedeckConfig::load_from(&path).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = LivedeckConfig::default();
        config
            .apply_overrides(lookup_from(&[
                (ENV_BASE_URL, " https://shop.example.com "),
                (ENV_LOG_CAPACITY, "20"),
            ]))
            .unwrap();

        assert_eq!(config.server.base_url, "https://shop.example.com");
        assert_eq!(config.dashboard_settings().log_capacity, 20);
    }

    #[test]
    fn bad_capacity_override_is_rejected() {
        let mut config = LivedeckConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[(ENV_LOG_CAPACITY, "lots")]))
            .unwrap_err();
        assert!(err.is_config());
        assert_eq!(config.dashboard.log_capacity, DEFAULT_LOG_CAPACITY);
    }

    #[test]
    fn validate_rejects_unusable_values() {
        let mut config = LivedeckConfig::default();
        assert!(config.validate().is_ok());

        config.server.base_url = "localhost:5000".into();
        assert!(config.validate().is_err());

        let mut config = LivedeckConfig::default();
        config.dashboard.log_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = LivedeckConfig::default();
        config.producer.interval = 0.0;
        assert!(config.validate().is_err());
    }
}
