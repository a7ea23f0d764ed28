//! Tolerant parsing of the endpoint's acknowledgement body

use punchsync_domain::DeliveryOutcome;
use serde::Deserialize;
use serde_json::Value;

/// Success body. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Acknowledgement {
    message: Option<String>,
    saved_count: u64,
    duplicates_skipped: u64,
    errors: Vec<Value>,
}

/// Build the outcome for an accepted (200/201) response.
///
/// A body that is not a JSON object still counts as accepted; its text
/// becomes the message.
pub fn parse_acknowledgement(status: u16, body: &str) -> DeliveryOutcome {
    let mut outcome = DeliveryOutcome::accepted();
    outcome.status_code = Some(status);

    match serde_json::from_str::<Acknowledgement>(body) {
        Ok(ack) => {
            outcome.message = ack.message;
            outcome.saved_count = ack.saved_count;
            outcome.duplicate_count = ack.duplicates_skipped;
            outcome.per_record_errors = ack.errors.into_iter().map(describe).collect();
        }
        Err(_) => {
            let text = body.trim();
            if !text.is_empty() {
                outcome.message = Some(text.to_string());
            }
        }
    }
    outcome
}

fn describe(entry: Value) -> String {
    match entry {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_all_counters() {
        let body = r#"{"message": "ok", "saved_count": 4, "duplicates_skipped": 1,
                      "errors": ["row 2: unknown employee"]}"#;
        let outcome = parse_acknowledgement(201, body);

        assert!(outcome.accepted);
        assert_eq!(outcome.status_code, Some(201));
        assert_eq!(outcome.message.as_deref(), Some("ok"));
        assert_eq!(outcome.saved_count, 4);
        assert_eq!(outcome.duplicate_count, 1);
        assert_eq!(outcome.per_record_errors, vec!["row 2: unknown employee".to_string()]);
    }

    #[test]
    fn missing_keys_default_to_zero() {
        let outcome = parse_acknowledgement(200, "{}");
        assert_eq!(outcome.saved_count, 0);
        assert_eq!(outcome.duplicate_count, 0);
        assert!(outcome.per_record_errors.is_empty());
        assert_eq!(outcome.message, None);
    }

    #[test]
    fn structured_errors_are_rendered_as_json() {
        let outcome = parse_acknowledgement(200, r#"{"errors": [{"index": 0, "reason": "dup"}]}"#);
        assert_eq!(outcome.per_record_errors, vec![r#"{"index":0,"reason":"dup"}"#.to_string()]);
    }

    #[test]
    fn plain_text_body_is_still_accepted() {
        let outcome = parse_acknowledgement(200, "  Created  ");
        assert!(outcome.accepted);
        assert_eq!(outcome.message.as_deref(), Some("Created"));
    }

    #[test]
    fn empty_body_has_no_message() {
        let outcome = parse_acknowledgement(201, "");
        assert!(outcome.accepted);
        assert_eq!(outcome.message, None);
    }
}
