//! Attendance punches and their timestamp representation

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::PUNCH_TIME_FORMAT;
use crate::errors::{PunchSyncError, SourceError};

/// Second-precision wall-clock time as reported by the terminal.
///
/// No timezone conversion is applied anywhere; the value is carried through
/// verbatim and rendered as `YYYY-MM-DD HH:MM:SS`, which is both the wire
/// representation and the windowing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PunchTime(NaiveDateTime);

impl PunchTime {
    /// Earliest representable punch time.
    pub const MIN: Self = Self(NaiveDateTime::MIN);

    /// Wrap a naive datetime, dropping sub-second precision.
    pub fn new(value: NaiveDateTime) -> Self {
        Self(value.with_nanosecond(0).unwrap_or(value))
    }

    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, min, sec))
            .map(Self)
    }

    /// Parse the fixed `YYYY-MM-DD HH:MM:SS` form.
    pub fn parse(text: &str) -> Result<Self, PunchSyncError> {
        NaiveDateTime::parse_from_str(text.trim(), PUNCH_TIME_FORMAT).map(Self).map_err(|_| {
            PunchSyncError::Configuration(format!(
                "invalid timestamp '{text}', use YYYY-MM-DD HH:MM:SS"
            ))
        })
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn checked_sub(self, delta: TimeDelta) -> Option<Self> {
        self.0.checked_sub_signed(delta).map(Self)
    }

    pub fn checked_add(self, delta: TimeDelta) -> Option<Self> {
        self.0.checked_add_signed(delta).map(Self)
    }
}

impl fmt::Display for PunchTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(PUNCH_TIME_FORMAT))
    }
}

impl FromStr for PunchTime {
    type Err = PunchSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDateTime> for PunchTime {
    fn from(value: NaiveDateTime) -> Self {
        Self::new(value)
    }
}

impl Serialize for PunchTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PunchTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// One punch event captured by a terminal.
///
/// Serializes to the endpoint wire shape:
/// `{"uid": "42", "id": 42, "state": 1, "timestamp": "2024-05-01 08:00:00", "type": 0}`
/// with an optional `device_ip`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Subject identity in string form.
    pub uid: String,
    /// Subject identity in integer form.
    pub id: i64,
    #[serde(rename = "state", default)]
    pub state_code: i32,
    pub timestamp: PunchTime,
    #[serde(rename = "type", default)]
    pub punch_type: i32,
    #[serde(rename = "device_ip", default, skip_serializing_if = "Option::is_none")]
    pub source_address: Option<String>,
}

impl AttendanceRecord {
    /// Build a record from the terminal's textual user id.
    ///
    /// The id must be numeric because the endpoint receives both forms.
    pub fn new(user_id: &str, timestamp: PunchTime) -> Result<Self, SourceError> {
        let uid = user_id.trim();
        let id = uid
            .parse::<i64>()
            .map_err(|_| SourceError::ProtocolFault(format!("non-numeric user id '{user_id}'")))?;
        Ok(Self {
            uid: uid.to_string(),
            id,
            state_code: 0,
            timestamp,
            punch_type: 0,
            source_address: None,
        })
    }

    pub fn from_id(id: i64, timestamp: PunchTime) -> Self {
        Self {
            uid: id.to_string(),
            id,
            state_code: 0,
            timestamp,
            punch_type: 0,
            source_address: None,
        }
    }

    pub fn with_state(mut self, state_code: i32) -> Self {
        self.state_code = state_code;
        self
    }

    pub fn with_punch_type(mut self, punch_type: i32) -> Self {
        self.punch_type = punch_type;
        self
    }

    pub fn with_source_address(mut self, address: impl Into<String>) -> Self {
        self.source_address = Some(address.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn at(text: &str) -> PunchTime {
        PunchTime::parse(text).unwrap()
    }

    #[test]
    fn punch_time_text_is_lossless() {
        let text = "2024-03-09 07:05:00";
        assert_eq!(at(text).to_string(), text);
    }

    #[test]
    fn punch_time_rejects_other_layouts() {
        assert!(PunchTime::parse("2024-03-09T07:05:00").is_err());
        assert!(PunchTime::parse("09/03/2024 07:05").is_err());
        let err = PunchTime::parse("yesterday").unwrap_err();
        assert!(
            matches!(err, PunchSyncError::Configuration(msg) if msg.contains("YYYY-MM-DD HH:MM:SS"))
        );
    }

    #[test]
    fn punch_time_drops_subseconds() {
        let raw = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_milli_opt(3, 4, 5, 678)
            .unwrap();
        assert_eq!(PunchTime::new(raw).to_string(), "2024-01-02 03:04:05");
    }

    #[test]
    fn record_serializes_to_wire_shape() {
        let record = AttendanceRecord::new("42", at("2024-05-01 08:00:00"))
            .unwrap()
            .with_state(1)
            .with_punch_type(4);

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "uid": "42",
                "id": 42,
                "state": 1,
                "timestamp": "2024-05-01 08:00:00",
                "type": 4
            })
        );
    }

    #[test]
    fn record_includes_device_ip_when_known() {
        let record =
            AttendanceRecord::from_id(7, at("2024-05-01 08:00:00")).with_source_address("10.1.1.9");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["device_ip"], "10.1.1.9");
        assert_eq!(value["uid"], "7");
    }

    #[test]
    fn record_parses_wire_shape_with_defaults() {
        let record: AttendanceRecord = serde_json::from_value(json!({
            "uid": "9",
            "id": 9,
            "timestamp": "2024-05-01 17:30:00"
        }))
        .unwrap();
        assert_eq!(record.state_code, 0);
        assert_eq!(record.punch_type, 0);
        assert_eq!(record.source_address, None);
    }

    #[test]
    fn non_numeric_user_id_is_protocol_fault() {
        let err = AttendanceRecord::new("abc", at("2024-05-01 08:00:00")).unwrap_err();
        assert!(matches!(err, SourceError::ProtocolFault(_)));
    }
}
