//! Incremental windowing
//!
//! The cursor is a timestamp, not an offset. Windows are boundary inclusive,
//! so records sharing the cursor's timestamp are delivered again rather than
//! risk being skipped.

use chrono::TimeDelta;
use punchsync_domain::{AttendanceRecord, PunchSyncError, PunchTime, Result};

/// Start of the next fetch window.
///
/// `last_successful_sync` when known, otherwise `now - lookback`, clamped to
/// the earliest representable time.
pub fn window_start(
    last_successful_sync: Option<PunchTime>,
    now: PunchTime,
    lookback: TimeDelta,
) -> PunchTime {
    last_successful_sync.unwrap_or_else(|| now.checked_sub(lookback).unwrap_or(PunchTime::MIN))
}

/// Keep records with `timestamp >= since`, preserving order.
pub fn retain_since(mut records: Vec<AttendanceRecord>, since: PunchTime) -> Vec<AttendanceRecord> {
    records.retain(|record| record.timestamp >= since);
    records
}

/// Operator-supplied inclusive range for manual fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: PunchTime,
    pub end: PunchTime,
}

impl TimeRange {
    pub fn new(start: PunchTime, end: PunchTime) -> Result<Self> {
        if start > end {
            return Err(PunchSyncError::Configuration(format!(
                "range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from `YYYY-MM-DD HH:MM:SS` text.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(PunchTime::parse(start)?, PunchTime::parse(end)?)
    }

    pub fn contains(&self, at: PunchTime) -> bool {
        self.start <= at && at <= self.end
    }

    pub fn retain(&self, mut records: Vec<AttendanceRecord>) -> Vec<AttendanceRecord> {
        records.retain(|record| self.contains(record.timestamp));
        records
    }
}
