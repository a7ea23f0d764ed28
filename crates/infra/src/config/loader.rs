//! Configuration loader
//!
//! ## Loading Strategy
//! 1. `PUNCHSYNC_CONFIG` names an explicit file, otherwise
//! 2. the first file found by [`probe_config_paths`], otherwise
//! 3. built-in defaults.
//!
//! Environment variables are then applied on top, and the result is
//! validated. JSON and TOML are supported, chosen by file extension.
//!
//! ## Environment Variables
//! - `PUNCHSYNC_DEVICE_IP`, `PUNCHSYNC_DEVICE_PORT`, `PUNCHSYNC_DEVICE_TIMEOUT`
//! - `PUNCHSYNC_ATTLOG_PATH`: attendance-log export to read
//! - `PUNCHSYNC_ENDPOINT_URL`, `PUNCHSYNC_ENDPOINT_TIMEOUT`
//! - `PUNCHSYNC_ACCEPT_INVALID_CERTS`: `true`/`false`
//! - `PUNCHSYNC_POLLING_INTERVAL`: seconds between cycles
//! - `PUNCHSYNC_MAX_RETRIES`: delivery attempts per cycle
//! - `PUNCHSYNC_RETRY_BACKOFF`: backoff base in seconds
//! - `PUNCHSYNC_MAX_ERRORS`: consecutive failures before the circuit opens
//! - `PUNCHSYNC_SYNC_ON_STARTUP`: `true`/`false`
//! - `PUNCHSYNC_LOG_DIR`: directory for the rolling log file

use std::path::{Path, PathBuf};
use std::str::FromStr;

use punchsync_domain::{Config, PunchSyncError, Result};

use crate::errors::InfraError;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "PUNCHSYNC_CONFIG";

/// Load configuration: file (explicit or probed) or defaults, then
/// environment overrides, then validation.
///
/// # Errors
/// `Configuration` when a file is unreadable or malformed, an override does
/// not parse, or the merged result fails validation.
pub fn load() -> Result<Config> {
    let base = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_from_file(Some(PathBuf::from(path)))?,
        Err(_) => match probe_config_paths() {
            Some(path) => load_from_file(Some(path))?,
            None => {
                tracing::info!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    let config = apply_env_overrides(base)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// `Configuration` if the file is missing, unreadable or malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PunchSyncError::Configuration(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PunchSyncError::Configuration(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PunchSyncError::Configuration(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Load `path`, writing defaults there first when it does not exist.
pub fn load_or_init(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "Config file missing, writing defaults");
        save_to_file(&Config::default(), path)?;
    }
    load_from_file(Some(path.to_path_buf()))
}

/// Persist `config` as JSON or TOML depending on the extension.
///
/// Parent directories are created as needed.
pub fn save_to_file(config: &Config, path: &Path) -> Result<()> {
    let rendered = render_config(config, path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, rendered)?;
    tracing::info!(path = %path.display(), "Configuration saved");
    Ok(())
}

/// Overlay `PUNCHSYNC_*` variables onto `config`.
pub fn apply_env_overrides(mut config: Config) -> Result<Config> {
    if let Ok(ip) = std::env::var("PUNCHSYNC_DEVICE_IP") {
        config.device.ip = ip;
    }
    if let Some(port) = env_parse("PUNCHSYNC_DEVICE_PORT")? {
        config.device.port = port;
    }
    if let Some(timeout) = env_parse("PUNCHSYNC_DEVICE_TIMEOUT")? {
        config.device.timeout_seconds = timeout;
    }
    if let Ok(path) = std::env::var("PUNCHSYNC_ATTLOG_PATH") {
        config.device.attlog_path = Some(PathBuf::from(path));
    }
    if let Ok(url) = std::env::var("PUNCHSYNC_ENDPOINT_URL") {
        config.endpoint.url = url;
    }
    if let Some(timeout) = env_parse("PUNCHSYNC_ENDPOINT_TIMEOUT")? {
        config.endpoint.timeout_seconds = timeout;
    }
    if let Some(accept) = env_bool("PUNCHSYNC_ACCEPT_INVALID_CERTS") {
        config.endpoint.accept_invalid_certs = accept;
    }
    if let Some(interval) = env_parse("PUNCHSYNC_POLLING_INTERVAL")? {
        config.sync.polling_interval_seconds = interval;
    }
    if let Some(retries) = env_parse("PUNCHSYNC_MAX_RETRIES")? {
        config.sync.max_delivery_retries = retries;
    }
    if let Some(backoff) = env_parse("PUNCHSYNC_RETRY_BACKOFF")? {
        config.sync.retry_backoff_base_seconds = backoff;
    }
    if let Some(threshold) = env_parse("PUNCHSYNC_MAX_ERRORS")? {
        config.sync.max_consecutive_errors = threshold;
    }
    if let Some(on_startup) = env_bool("PUNCHSYNC_SYNC_ON_STARTUP") {
        config.sync.sync_on_startup = on_startup;
    }
    if let Ok(dir) = std::env::var("PUNCHSYNC_LOG_DIR") {
        config.logging.directory = Some(PathBuf::from(dir));
    }
    Ok(config)
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("json")
}

/// Parse configuration, format chosen by the extension of `path`.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    match extension(path) {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PunchSyncError::Configuration(format!("Invalid JSON format: {e}"))),
        other => Err(PunchSyncError::Configuration(format!("Unsupported config format: {other}"))),
    }
}

fn render_config(config: &Config, path: &Path) -> Result<String> {
    match extension(path) {
        "toml" => toml::to_string_pretty(config).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::to_string_pretty(config)
            .map_err(|e| PunchSyncError::Internal(format!("Cannot render JSON: {e}"))),
        other => Err(PunchSyncError::Configuration(format!("Unsupported config format: {other}"))),
    }
}

/// Probe the working directory and the executable's directory.
///
/// Candidates, in order: `punchsync.toml`, `punchsync.json`,
/// `config/punchsync.toml`, `config/punchsync.json`.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] =
        ["punchsync.toml", "punchsync.json", "config/punchsync.toml", "config/punchsync.json"];

    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots.iter().flat_map(|root| NAMES.iter().map(move |name| root.join(name))).find(|p| p.exists())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            PunchSyncError::Configuration(format!("Invalid value for {key} ('{raw}'): {e}"))
        }),
        Err(_) => Ok(None),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
