//! Delivery retry policy
//!
//! Linear backoff: after failed attempt `n` (1-based) the policy waits
//! `n * backoff_base` before resending the identical batch. Every call keeps
//! its own attempt counter, so a forced sync and a scheduled cycle never
//! share retry state.

use std::time::Duration;

use punchsync_domain::{AttendanceRecord, DeliveryOutcome, PunchSyncError, SyncConfig};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::sync::ports::DeliveryChannel;

/// Attempt budget and backoff base for one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
}

/// Successful delivery of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReceipt {
    pub outcome: DeliveryOutcome,
    pub attempts: u32,
    pub record_count: usize,
}

/// Batch not accepted within the attempt budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("delivery of {record_count} records failed after {attempts} attempts: {last_error}")]
pub struct DeliveryFailure {
    pub attempts: u32,
    pub record_count: usize,
    /// `DeliveryRejected` or `DeliveryTransportFault` from the final attempt.
    pub last_error: PunchSyncError,
}

impl From<DeliveryFailure> for PunchSyncError {
    fn from(failure: DeliveryFailure) -> Self {
        failure.last_error
    }
}

impl DeliveryPolicy {
    /// At least one attempt is always made.
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), backoff_base }
    }

    /// Attempts from `max_delivery_retries`, base from `retry_backoff_base_seconds`.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.max_delivery_retries, config.retry_backoff_base())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait after failed attempt `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(attempt)
    }

    /// Deliver `batch` through `channel`, retrying rejections and transport
    /// faults. Backoff waits are not cancellable.
    #[instrument(
        skip(self, channel, batch),
        fields(record_count = batch.len(), endpoint = %channel.endpoint())
    )]
    pub async fn deliver(
        &self,
        channel: &dyn DeliveryChannel,
        batch: &[AttendanceRecord],
    ) -> Result<DeliveryReceipt, DeliveryFailure> {
        if batch.is_empty() {
            return Ok(DeliveryReceipt {
                outcome: DeliveryOutcome::accepted(),
                attempts: 0,
                record_count: 0,
            });
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let last_error = match channel.deliver(batch).await {
                Ok(outcome) if outcome.accepted => {
                    log_accepted(&outcome, attempt, batch.len());
                    return Ok(DeliveryReceipt {
                        outcome,
                        attempts: attempt,
                        record_count: batch.len(),
                    });
                }
                Ok(outcome) => PunchSyncError::DeliveryRejected {
                    status: outcome.status_code.unwrap_or_default(),
                    body: outcome.message.unwrap_or_default(),
                },
                Err(err) => PunchSyncError::from(err),
            };

            if attempt >= self.max_attempts {
                error!(
                    attempt,
                    max_attempts = self.max_attempts,
                    error = %last_error,
                    "Delivery attempts exhausted"
                );
                return Err(DeliveryFailure {
                    attempts: attempt,
                    record_count: batch.len(),
                    last_error,
                });
            }

            let wait = self.backoff_for(attempt);
            warn!(
                attempt,
                max_attempts = self.max_attempts,
                error = %last_error,
                backoff_secs = wait.as_secs(),
                "Delivery attempt failed, retrying"
            );
            tokio::time::sleep(wait).await;
        }
    }
}

fn log_accepted(outcome: &DeliveryOutcome, attempt: u32, record_count: usize) {
    info!(
        attempt,
        record_count,
        saved = outcome.saved_count,
        duplicates = outcome.duplicate_count,
        message = outcome.message.as_deref().unwrap_or(""),
        "Batch accepted by endpoint"
    );
    if outcome.has_partial_errors() {
        for (index, detail) in outcome.per_record_errors.iter().enumerate() {
            warn!(index, detail = %detail, "Endpoint reported a per-record error");
        }
    }
}
