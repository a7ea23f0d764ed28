//! Domain constants
//!
//! Defaults shared by the configuration layer and the adapters.

// Wire format
pub const PUNCH_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Terminal defaults
pub const DEFAULT_DEVICE_IP: &str = "192.168.41.155";
pub const DEFAULT_DEVICE_PORT: u16 = 4370;
pub const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_ATTLOG_FILE: &str = "attlog.dat";
pub const PORT_DETECTION_TIMEOUT_SECS: u64 = 2;
pub const CANDIDATE_DEVICE_PORTS: [u16; 6] = [4370, 80, 8080, 5000, 3000, 22];

// Endpoint defaults
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:8000/api/pointages";
pub const DEFAULT_ENDPOINT_TIMEOUT_SECS: u64 = 30;

// Sync engine defaults
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_MAX_DELIVERY_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_BASE_SECS: u64 = 10;
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 5;
pub const DEFAULT_ERROR_COOLDOWN_SECS: u64 = 60;
pub const DEFAULT_BOOTSTRAP_LOOKBACK_HOURS: u64 = 24;
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 10;
/// Upper bound for polling interval, cooldown and backoff base (one week).
pub const MAX_WAIT_SECS: u64 = 7 * 24 * 60 * 60;

// Logging
pub const DEFAULT_LOG_FILE: &str = "punchsync.log";
