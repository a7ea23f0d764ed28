//! Conversions from external infrastructure errors into domain errors.

use std::time::Duration;

use punchsync_domain::{DeliveryError, PunchSyncError};
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PunchSyncError);

impl From<InfraError> for PunchSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PunchSyncError> for InfraError {
    fn from(value: PunchSyncError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PunchSyncError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        if value.is_builder() {
            return InfraError(PunchSyncError::Configuration(format!(
                "invalid HTTP client settings: {value}"
            )));
        }

        if value.is_timeout() || value.is_connect() || value.is_request() {
            return InfraError(PunchSyncError::DeliveryTransportFault(value.to_string()));
        }

        if let Some(status) = value.status() {
            return InfraError(PunchSyncError::DeliveryRejected {
                status: status.as_u16(),
                body: status.canonical_reason().unwrap_or("unknown status").to_string(),
            });
        }

        InfraError(PunchSyncError::Internal(value.to_string()))
    }
}

/// Classify a transport failure for the delivery port.
///
/// `timeout` is the configured request timeout, reported back on expiry.
pub fn delivery_error(err: &HttpError, timeout: Duration) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Timeout(timeout)
    } else {
        DeliveryError::Connection(err.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* toml → PunchSyncError */
/* -------------------------------------------------------------------------- */

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(PunchSyncError::Configuration(format!("Invalid TOML format: {value}")))
    }
}

impl From<toml::ser::Error> for InfraError {
    fn from(value: toml::ser::Error) -> Self {
        InfraError(PunchSyncError::Internal(format!("Cannot render TOML: {value}")))
    }
}
