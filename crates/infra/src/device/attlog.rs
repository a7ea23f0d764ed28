//! Record source backed by the terminal's attendance-log export
//!
//! The export (`attlog.dat`) holds one punch per line:
//!
//! ```text
//!      42	2024-05-01 08:00:00	1	0	0	0
//! ```
//!
//! Fields are tab separated (whitespace is tolerated): user id, timestamp,
//! state, punch type, then terminal-specific columns that are ignored.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use punchsync_core::RecordSource;
use punchsync_domain::constants::DEFAULT_ATTLOG_FILE;
use punchsync_domain::{AttendanceRecord, DeviceConfig, DeviceProbe, PunchTime, SourceError};
use tracing::{debug, instrument, warn};

use super::probe::TcpDeviceProbe;

/// Reads punches from an attendance-log export.
#[derive(Debug, Clone)]
pub struct AttlogSource {
    path: PathBuf,
    device_ip: Option<String>,
    probe: TcpDeviceProbe,
}

impl AttlogSource {
    pub fn new(path: impl Into<PathBuf>, probe: TcpDeviceProbe) -> Self {
        Self { path: path.into(), device_ip: None, probe }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        let path = config.attlog_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_ATTLOG_FILE));
        Self::new(path, TcpDeviceProbe::from_config(config)).with_device_ip(config.ip.clone())
    }

    /// Stamp every record with the originating terminal.
    pub fn with_device_ip(mut self, ip: impl Into<String>) -> Self {
        self.device_ip = Some(ip.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<AttendanceRecord>, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            SourceError::Unreachable(format!("cannot read {}: {err}", self.path.display()))
        })?;
        parse_export(&contents, self.device_ip.as_deref())
    }
}

#[async_trait]
impl RecordSource for AttlogSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_since(&self, since: PunchTime) -> Result<Vec<AttendanceRecord>, SourceError> {
        let mut records = self.read_all().await?;
        let total = records.len();
        records.retain(|record| record.timestamp >= since);
        debug!(total, selected = records.len(), "Read attendance export");
        Ok(records)
    }

    async fn probe(&self) -> DeviceProbe {
        let mut report = self.probe.probe().await;
        report.info.insert("source".to_string(), self.path.display().to_string());
        match self.read_all().await {
            Ok(records) => {
                let users: BTreeSet<i64> = records.iter().map(|record| record.id).collect();
                report.info.insert("users_count".to_string(), users.len().to_string());
                report.info.insert("attendances_count".to_string(), records.len().to_string());
            }
            Err(err) => warn!(error = %err, "Attendance export unreadable during probe"),
        }
        report
    }
}

/// Parse a whole export. Blank lines are skipped.
pub fn parse_export(
    contents: &str,
    device_ip: Option<&str>,
) -> Result<Vec<AttendanceRecord>, SourceError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let record = parse_line(line).map_err(|reason| {
                SourceError::ProtocolFault(format!("line {}: {reason}", index + 1))
            })?;
            Ok(match device_ip {
                Some(ip) => record.with_source_address(ip),
                None => record,
            })
        })
        .collect()
}

fn parse_line(line: &str) -> Result<AttendanceRecord, String> {
    let (user_id, timestamp, codes): (&str, String, Vec<&str>) = if line.contains('\t') {
        let mut fields = line.split('\t').map(str::trim);
        let user_id = fields.next().unwrap_or_default();
        let timestamp = fields.next().unwrap_or_default().to_string();
        (user_id, timestamp, fields.collect())
    } else {
        let mut tokens = line.split_whitespace();
        let user_id = tokens.next().unwrap_or_default();
        let timestamp = match (tokens.next(), tokens.next()) {
            (Some(date), Some(time)) => format!("{date} {time}"),
            (Some(date), None) => date.to_string(),
            _ => String::new(),
        };
        (user_id, timestamp, tokens.collect())
    };

    if user_id.is_empty() {
        return Err("missing user id".to_string());
    }
    if timestamp.is_empty() {
        return Err("missing timestamp".to_string());
    }
    let at = PunchTime::parse(&timestamp).map_err(|_| format!("bad timestamp '{timestamp}'"))?;
    let state = parse_code(codes.first().copied(), "state")?;
    let punch_type = parse_code(codes.get(1).copied(), "punch type")?;

    AttendanceRecord::new(user_id, at)
        .map(|record| record.with_state(state).with_punch_type(punch_type))
        .map_err(|err| err.to_string())
}

/// Optional numeric column; absent means 0.
fn parse_code(field: Option<&str>, name: &str) -> Result<i32, String> {
    match field.map(str::trim).filter(|text| !text.is_empty()) {
        None => Ok(0),
        Some(text) => text.parse().map_err(|_| format!("bad {name} '{text}'")),
    }
}
