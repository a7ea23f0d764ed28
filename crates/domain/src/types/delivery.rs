//! Result of handing one batch to the receiving endpoint

use serde::{Deserialize, Serialize};

/// What the endpoint said about a delivered batch.
///
/// `accepted == false` is an endpoint-level rejection; transport failures are
/// reported separately as [`crate::DeliveryError`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub saved_count: u64,
    pub duplicate_count: u64,
    pub per_record_errors: Vec<String>,
}

impl DeliveryOutcome {
    pub fn accepted() -> Self {
        Self { accepted: true, ..Self::default() }
    }

    pub fn rejected(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            accepted: false,
            status_code: Some(status_code),
            message: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn with_counts(mut self, saved_count: u64, duplicate_count: u64) -> Self {
        self.saved_count = saved_count;
        self.duplicate_count = duplicate_count;
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.per_record_errors = errors;
        self
    }

    pub fn has_partial_errors(&self) -> bool {
        self.accepted && !self.per_record_errors.is_empty()
    }
}
