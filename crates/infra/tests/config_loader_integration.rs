//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading and saving configuration files.

use std::io::Write;

use punchsync_domain::{Config, PunchSyncError};
use punchsync_infra::config;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "device": {
            "ip": "10.0.0.12",
            "port": 4371,
            "attlog_path": "/var/lib/punchsync/attlog.dat"
        },
        "endpoint": {
            "url": "https://hr.example.com/api/pointages",
            "timeout_seconds": 15
        },
        "sync": {
            "polling_interval_seconds": 120,
            "max_consecutive_errors": 3
        }
    }"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("json");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_ok(), "Failed to load config from JSON file");
    let config = result.unwrap();

    assert_eq!(config.device.ip, "10.0.0.12");
    assert_eq!(config.device.port, 4371);
    assert_eq!(
        config.device.attlog_path.as_deref(),
        Some(std::path::Path::new("/var/lib/punchsync/attlog.dat"))
    );
    assert_eq!(config.endpoint.url, "https://hr.example.com/api/pointages");
    assert_eq!(config.endpoint.timeout_seconds, 15);
    assert_eq!(config.sync.polling_interval_seconds, 120);
    assert_eq!(config.sync.max_consecutive_errors, 3);

    // Unspecified values keep their defaults
    assert_eq!(config.device.timeout_seconds, 5);
    assert_eq!(config.sync.max_delivery_retries, 3);
    assert_eq!(config.sync.retry_backoff_base_seconds, 10);
    assert_eq!(config.sync.error_cooldown_seconds, 60);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[device]
ip = "192.168.1.201"

[sync]
polling_interval_seconds = 30
sync_on_startup = false
"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(toml_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("toml");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let config = config::load_from_file(Some(path.clone())).expect("TOML config should load");

    assert_eq!(config.device.ip, "192.168.1.201");
    assert_eq!(config.device.port, 4370);
    assert_eq!(config.sync.polling_interval_seconds, 30);
    assert!(!config.sync.sync_on_startup);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_file_not_found() {
    let result = config::load_from_file(Some("/nonexistent/punchsync.json".into()));

    let err = result.expect_err("Should fail when file doesn't exist");
    assert!(matches!(err, PunchSyncError::Configuration(msg) if msg.contains("not found")));
}

#[test]
fn test_load_config_invalid_toml() {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(b"[sync\npolling = ").expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("toml");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let err = config::load_from_file(Some(path.clone())).expect_err("Should reject broken TOML");
    assert!(matches!(err, PunchSyncError::Configuration(msg) if msg.contains("TOML")));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_save_and_reload_preserves_values() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let mut original = Config::default();
    original.device.ip = "172.16.0.9".to_string();
    original.endpoint.url = "http://hr.internal:8000/api/pointages".to_string();
    original.sync.max_delivery_retries = 5;

    for name in ["nested/punchsync.toml", "nested/punchsync.json"] {
        let path = dir.path().join(name);
        config::save_to_file(&original, &path).expect("Config should save");
        let reloaded = config::load_from_file(Some(path)).expect("Saved config should load");
        assert_eq!(reloaded, original, "{name}");
    }
}

#[test]
fn test_load_or_init_writes_defaults_once() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("punchsync.toml");

    let created = config::load_or_init(&path).expect("Defaults should be written");
    assert!(path.exists());
    assert_eq!(created, Config::default());

    let mut edited = created.clone();
    edited.sync.polling_interval_seconds = 900;
    config::save_to_file(&edited, &path).expect("Config should save");

    let reloaded = config::load_or_init(&path).expect("Existing file should load");
    assert_eq!(reloaded.sync.polling_interval_seconds, 900);
}
