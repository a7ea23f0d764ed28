//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CANDIDATE_DEVICE_PORTS, DEFAULT_BOOTSTRAP_LOOKBACK_HOURS, DEFAULT_DEVICE_IP,
    DEFAULT_DEVICE_PORT, DEFAULT_DEVICE_TIMEOUT_SECS, DEFAULT_ENDPOINT_TIMEOUT_SECS,
    DEFAULT_ENDPOINT_URL, DEFAULT_ERROR_COOLDOWN_SECS, DEFAULT_LOG_FILE,
    DEFAULT_MAX_CONSECUTIVE_ERRORS, DEFAULT_MAX_DELIVERY_RETRIES, DEFAULT_POLLING_INTERVAL_SECS,
    DEFAULT_RETRY_BACKOFF_BASE_SECS, DEFAULT_STOP_TIMEOUT_SECS, MAX_WAIT_SECS,
};
use crate::{PunchSyncError, Result};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub endpoint: EndpointConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Terminal connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub ip: String,
    pub port: u16,
    pub timeout_seconds: u64,
    /// Attendance-log export read by the file-backed source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attlog_path: Option<PathBuf>,
    /// Ports tried, in order, by port detection.
    pub candidate_ports: Vec<u16>,
}

/// Receiving endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

/// Sync engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub polling_interval_seconds: u64,
    pub max_delivery_retries: u32,
    pub retry_backoff_base_seconds: u64,
    pub max_consecutive_errors: u32,
    pub error_cooldown_seconds: u64,
    pub bootstrap_lookback_hours: u64,
    pub sync_on_startup: bool,
    pub stop_timeout_seconds: u64,
}

/// Log sink settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    pub file_name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            ip: DEFAULT_DEVICE_IP.to_string(),
            port: DEFAULT_DEVICE_PORT,
            timeout_seconds: DEFAULT_DEVICE_TIMEOUT_SECS,
            attlog_path: None,
            candidate_ports: CANDIDATE_DEVICE_PORTS.to_vec(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT_URL.to_string(),
            timeout_seconds: DEFAULT_ENDPOINT_TIMEOUT_SECS,
            accept_invalid_certs: true,
            user_agent: format!("punchsync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            polling_interval_seconds: DEFAULT_POLLING_INTERVAL_SECS,
            max_delivery_retries: DEFAULT_MAX_DELIVERY_RETRIES,
            retry_backoff_base_seconds: DEFAULT_RETRY_BACKOFF_BASE_SECS,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
            error_cooldown_seconds: DEFAULT_ERROR_COOLDOWN_SECS,
            bootstrap_lookback_hours: DEFAULT_BOOTSTRAP_LOOKBACK_HOURS,
            sync_on_startup: true,
            stop_timeout_seconds: DEFAULT_STOP_TIMEOUT_SECS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { directory: None, file_name: DEFAULT_LOG_FILE.to_string() }
    }
}

impl Config {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.device.ip.trim().is_empty() {
            return Err(invalid("device.ip must not be empty"));
        }
        if self.device.port == 0 {
            return Err(invalid("device.port must be between 1 and 65535"));
        }
        if self.device.timeout_seconds == 0 {
            return Err(invalid("device.timeout_seconds must be positive"));
        }
        if self.endpoint.url.trim().is_empty() {
            return Err(invalid("endpoint.url must not be empty"));
        }
        if self.endpoint.timeout_seconds == 0 {
            return Err(invalid("endpoint.timeout_seconds must be positive"));
        }
        if self.sync.polling_interval_seconds == 0 {
            return Err(invalid("sync.polling_interval_seconds must be positive"));
        }
        for (name, value) in [
            ("sync.polling_interval_seconds", self.sync.polling_interval_seconds),
            ("sync.error_cooldown_seconds", self.sync.error_cooldown_seconds),
            ("sync.retry_backoff_base_seconds", self.sync.retry_backoff_base_seconds),
        ] {
            if value > MAX_WAIT_SECS {
                return Err(PunchSyncError::Configuration(format!(
                    "{name} must not exceed {MAX_WAIT_SECS} seconds"
                )));
            }
        }
        if self.sync.max_delivery_retries == 0 {
            return Err(invalid("sync.max_delivery_retries must be at least 1"));
        }
        if self.sync.max_consecutive_errors == 0 {
            return Err(invalid("sync.max_consecutive_errors must be at least 1"));
        }
        if self.logging.file_name.trim().is_empty() {
            return Err(invalid("logging.file_name must not be empty"));
        }
        Ok(())
    }

    /// Socket address of the terminal, `ip:port`.
    pub fn device_address(&self) -> String {
        format!("{}:{}", self.device.ip, self.device.port)
    }
}

impl SyncConfig {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_seconds)
    }

    pub fn retry_backoff_base(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_base_seconds)
    }

    pub fn error_cooldown(&self) -> Duration {
        Duration::from_secs(self.error_cooldown_seconds)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_seconds)
    }
}

fn invalid(message: &str) -> PunchSyncError {
    PunchSyncError::Configuration(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.device.port, 4370);
        assert_eq!(config.endpoint.url, "http://localhost:8000/api/pointages");
        assert_eq!(config.sync.polling_interval(), Duration::from_secs(300));
        assert_eq!(config.sync.max_delivery_retries, 3);
        assert_eq!(config.sync.retry_backoff_base(), Duration::from_secs(10));
        assert_eq!(config.sync.max_consecutive_errors, 5);
        assert_eq!(config.sync.error_cooldown(), Duration::from_secs(60));
    }

    #[test]
    fn rejects_zero_polling_interval() {
        let mut config = Config::default();
        config.sync.polling_interval_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PunchSyncError::Configuration(msg) if msg.contains("polling")));
    }

    #[test]
    fn rejects_waits_longer_than_a_week() {
        let mut config = Config::default();
        config.sync.polling_interval_seconds = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PunchSyncError::Configuration(msg) if msg.contains("polling")));

        let mut config = Config::default();
        config.sync.error_cooldown_seconds = MAX_WAIT_SECS + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sync.polling_interval_seconds = MAX_WAIT_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_retries_and_threshold() {
        let mut config = Config::default();
        config.sync.max_delivery_retries = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sync.max_consecutive_errors = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"device": {"ip": "10.0.0.7"}, "sync": {"max_delivery_retries": 5}}"#)
                .unwrap();
        assert_eq!(config.device.ip, "10.0.0.7");
        assert_eq!(config.device.port, 4370);
        assert_eq!(config.sync.max_delivery_retries, 5);
        assert_eq!(config.sync.polling_interval_seconds, 300);
        assert_eq!(config.device_address(), "10.0.0.7:4370");
    }
}
