//! Error types used throughout the application

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for PunchSync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PunchSyncError {
    /// Terminal did not answer.
    #[error("Source unreachable: {0}")]
    UnreachableSource(String),

    /// Terminal answered but the data was malformed.
    #[error("Source protocol fault: {0}")]
    SourceProtocolFault(String),

    /// Connection or timeout talking to the endpoint.
    #[error("Delivery transport fault: {0}")]
    DeliveryTransportFault(String),

    /// Endpoint reachable but answered with a non-success status.
    #[error("Delivery rejected with status {status}: {body}")]
    DeliveryRejected { status: u16, body: String },

    /// Malformed configuration or operator input.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PunchSyncError {
    /// Stable label suitable for structured logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnreachableSource(_) => "unreachable_source",
            Self::SourceProtocolFault(_) => "source_protocol",
            Self::DeliveryTransportFault(_) => "delivery_transport",
            Self::DeliveryRejected { .. } => "delivery_rejected",
            Self::Configuration(_) => "configuration",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }
}

/// Failures raised by a record source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("terminal unreachable: {0}")]
    Unreachable(String),

    #[error("terminal protocol fault: {0}")]
    ProtocolFault(String),
}

/// Transport failures raised by a delivery channel.
///
/// An HTTP-level rejection is not an error here; it is reported through
/// [`crate::DeliveryOutcome::accepted`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<SourceError> for PunchSyncError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unreachable(msg) => Self::UnreachableSource(msg),
            SourceError::ProtocolFault(msg) => Self::SourceProtocolFault(msg),
        }
    }
}

impl From<DeliveryError> for PunchSyncError {
    fn from(err: DeliveryError) -> Self {
        Self::DeliveryTransportFault(err.to_string())
    }
}

impl From<std::io::Error> for PunchSyncError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PunchSyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(format!("invalid JSON: {err}"))
    }
}

/// Result type alias for PunchSync operations
pub type Result<T, E = PunchSyncError> = std::result::Result<T, E>;
