//! # Invocation data model.
//!
//! An [`Invocation`] is one unit of work fetched from the control endpoint:
//! a request id, an opaque payload, an optional absolute deadline, and
//! trace/context metadata. It is created by the endpoint client, consumed
//! exactly once by the handler, and never mutated after creation.
//!
//! A [`FailureReport`] is the wire form of an invocation failure posted back
//! to the endpoint (kind + message + optional stack-like detail).

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::InvocationError;

/// One unit of work fetched from the control endpoint.
#[derive(Clone, Debug)]
pub struct Invocation {
    /// Unique request identifier assigned by the control endpoint.
    pub request_id: String,
    /// Opaque payload bytes; the core never interprets them.
    pub payload: Bytes,
    /// Absolute deadline as milliseconds since the Unix epoch, if the
    /// endpoint supplied one.
    pub deadline_ms: Option<u64>,
    /// Optional trace/context metadata forwarded from the endpoint.
    pub metadata: HashMap<String, String>,
}

impl Invocation {
    /// Returns the time remaining until the invocation deadline.
    ///
    /// `None` if the endpoint supplied no deadline; `Some(Duration::ZERO)`
    /// if the deadline already passed.
    pub fn remaining_time(&self) -> Option<Duration> {
        remaining_from_deadline(self.deadline_ms)
    }
}

/// Time left until an absolute epoch-ms deadline, clamped at zero.
pub(crate) fn remaining_from_deadline(deadline_ms: Option<u64>) -> Option<Duration> {
    let deadline_ms = deadline_ms?;
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64;
    Some(Duration::from_millis(deadline_ms.saturating_sub(now_ms)))
}

/// Failure descriptor posted to the control endpoint for a failed invocation
/// or a failed initialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Stable failure kind label (e.g. `invocation_handler`).
    #[serde(rename = "errorType")]
    pub kind: String,
    /// Human-readable failure message.
    #[serde(rename = "errorMessage")]
    pub message: String,
    /// Optional stack-like detail lines.
    #[serde(rename = "stackTrace", skip_serializing_if = "Option::is_none")]
    pub detail: Option<Vec<String>>,
}

impl FailureReport {
    /// Builds a report for a failed handler initialization.
    pub fn init_failure(message: impl Into<String>) -> Self {
        Self {
            kind: "initialization".to_string(),
            message: message.into(),
            detail: None,
        }
    }
}

impl From<&InvocationError> for FailureReport {
    fn from(err: &InvocationError) -> Self {
        Self {
            kind: err.as_label().to_string(),
            message: err.as_message(),
            detail: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_time_absent_without_deadline() {
        let inv = Invocation {
            request_id: "r1".into(),
            payload: Bytes::new(),
            deadline_ms: None,
            metadata: HashMap::new(),
        };
        assert_eq!(inv.remaining_time(), None);
    }

    #[test]
    fn test_remaining_time_zero_for_past_deadline() {
        let inv = Invocation {
            request_id: "r1".into(),
            payload: Bytes::new(),
            deadline_ms: Some(1),
            metadata: HashMap::new(),
        };
        assert_eq!(inv.remaining_time(), Some(Duration::ZERO));
    }

    #[test]
    fn test_remaining_time_positive_for_future_deadline() {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        let inv = Invocation {
            request_id: "r1".into(),
            payload: Bytes::new(),
            deadline_ms: Some(now_ms + 60_000),
            metadata: HashMap::new(),
        };
        let remaining = inv.remaining_time().unwrap();
        assert!(remaining > Duration::from_secs(50));
        assert!(remaining <= Duration::from_secs(60));
    }

    #[test]
    fn test_failure_report_from_invocation_error() {
        let err = InvocationError::Decode {
            message: "unexpected end of input".into(),
        };
        let report = FailureReport::from(&err);
        assert_eq!(report.kind, "invocation_decode");
        assert!(report.message.contains("unexpected end of input"));
        assert_eq!(report.detail, None);
    }

    #[test]
    fn test_failure_report_wire_field_names() {
        let report = FailureReport::init_failure("no database");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errorType"], "initialization");
        assert_eq!(json["errorMessage"], "no database");
        assert!(json.get("stackTrace").is_none());
    }
}
