//! Error types used by the funcvisor runtime.
//!
//! This module defines the error taxonomy for the invocation loop:
//!
//! - [`EndpointError`] — failures talking to the control endpoint.
//! - [`InvocationError`] — invocation-scoped failures (reported, never fatal).
//! - [`RuntimeError`] — process-fatal failures of the loop itself.
//! - [`TerminationError`] — aggregate of shutdown-hook failures.
//! - [`RegisterError`] — hook registration after shutdown has begun.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging
//! and for building failure reports posted to the control endpoint.

use std::time::Duration;
use thiserror::Error;

/// Boxed error type accepted from user handlers and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Failures reaching or talking to the control endpoint.
///
/// Produced by the [`EndpointClient`](crate::client::EndpointClient). The client
/// never retries internally; how to react is the caller's decision:
/// [`EndpointError::Unavailable`] during fetch is retried with bounded backoff,
/// everything else is fatal to the loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EndpointError {
    /// The endpoint could not be reached, or the request timed out.
    #[error("control endpoint unavailable: {reason}")]
    Unavailable {
        /// Transport-level cause (connect failure, timeout, 5xx).
        reason: String,
    },

    /// The endpoint responded, but the response violates the expected shape.
    #[error("malformed control endpoint response: {detail}")]
    MalformedResponse {
        /// What was wrong with the response (status, missing header, bad body).
        detail: String,
    },
}

impl EndpointError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EndpointError::Unavailable { .. } => "endpoint_unavailable",
            EndpointError::MalformedResponse { .. } => "endpoint_malformed_response",
        }
    }

    /// Indicates whether the fetch loop may retry after this error.
    ///
    /// Only [`EndpointError::Unavailable`] is retryable; a malformed response
    /// means the loop can no longer trust its own protocol state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EndpointError::Unavailable { .. })
    }
}

/// # Invocation-scoped failures.
///
/// These are reported to the control endpoint via
/// [`report_failure`](crate::client::EndpointClient::report_failure) and the
/// loop then continues with the next invocation. None of them is fatal.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum InvocationError {
    /// The invocation payload could not be decoded into the handler's input type.
    #[error("payload decoding failed: {message}")]
    Decode {
        /// The underlying codec error message.
        message: String,
    },

    /// The handler's output could not be encoded into a response payload.
    #[error("result encoding failed: {message}")]
    Encode {
        /// The underlying codec error message.
        message: String,
    },

    /// User handler code failed.
    #[error("handler failed: {message}")]
    Handler {
        /// The underlying error message.
        message: String,
    },

    /// The handler did not complete before the invocation deadline.
    ///
    /// The underlying user computation is not force-terminated; its eventual
    /// result is discarded. This is a documented resource-leak risk per
    /// invocation, not a correctness violation of the loop.
    #[error("deadline exceeded after {budget:?}")]
    DeadlineExceeded {
        /// The time budget that was exhausted.
        budget: Duration,
    },
}

impl InvocationError {
    /// Returns a short stable label (snake_case) for use in logs and
    /// failure reports.
    ///
    /// # Example
    /// ```
    /// use funcvisor::InvocationError;
    ///
    /// let err = InvocationError::Handler { message: "boom".into() };
    /// assert_eq!(err.as_label(), "invocation_handler");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            InvocationError::Decode { .. } => "invocation_decode",
            InvocationError::Encode { .. } => "invocation_encode",
            InvocationError::Handler { .. } => "invocation_handler",
            InvocationError::DeadlineExceeded { .. } => "invocation_deadline_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            InvocationError::Decode { message } => format!("decode: {message}"),
            InvocationError::Encode { message } => format!("encode: {message}"),
            InvocationError::Handler { message } => format!("handler: {message}"),
            InvocationError::DeadlineExceeded { budget } => {
                format!("deadline exceeded: budget={budget:?}")
            }
        }
    }
}

/// # Process-fatal failures of the invocation loop.
///
/// Any of these terminates the run; the hosting process is expected to exit
/// non-zero with the cause logged.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Handler construction failed during the initialize phase.
    #[error("handler initialization failed: {message}")]
    Init {
        /// The provider's error message.
        message: String,
    },

    /// Fetching the next invocation failed and the retry budget is exhausted
    /// (or the failure was not retryable to begin with).
    #[error("fetching next invocation failed after {attempts} attempt(s): {source}")]
    FetchExhausted {
        /// Total fetch attempts made, including the first.
        attempts: u32,
        /// The last endpoint failure observed.
        source: EndpointError,
    },

    /// Posting an invocation outcome failed. The loop cannot safely continue
    /// if it cannot communicate outcomes.
    #[error("failed to report outcome for request {request_id}: {source}")]
    Report {
        /// Request id of the invocation whose outcome could not be posted.
        request_id: String,
        /// The endpoint failure observed while reporting.
        source: EndpointError,
    },

    /// The runner was driven from the wrong state (e.g. `run` before
    /// `initialize`, or `initialize` twice).
    #[error("runner is in state {state}, cannot proceed")]
    InvalidState {
        /// The state the runner was actually in.
        state: &'static str,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Init { .. } => "runtime_init_failed",
            RuntimeError::FetchExhausted { .. } => "runtime_fetch_exhausted",
            RuntimeError::Report { .. } => "runtime_report_failed",
            RuntimeError::InvalidState { .. } => "runtime_invalid_state",
        }
    }
}

/// A single failed shutdown hook inside a [`TerminationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    /// Name the hook was registered under.
    pub hook: String,
    /// The hook's error message.
    pub message: String,
}

/// # Aggregate of shutdown-hook failures.
///
/// Returned by [`Terminator::terminate`](crate::Terminator::terminate)
/// when at least one hook failed. One hook's failure never prevents the other
/// hooks from running, so the aggregate lists every failure with its hook name.
///
/// The type is `Clone` so an idempotent second `terminate()` call can return
/// the same aggregate without re-running hooks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} shutdown hook(s) failed", failures.len())]
pub struct TerminationError {
    /// Every hook failure, in hook execution order.
    pub failures: Vec<HookFailure>,
}

impl TerminationError {
    /// Returns a human-readable message listing every failed hook.
    pub fn as_message(&self) -> String {
        let parts: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.hook, f.message))
            .collect();
        format!("shutdown hooks failed: [{}]", parts.join("; "))
    }
}

/// # Hook registration failures.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegisterError {
    /// `register` was called after shutdown had already started.
    #[error("cannot register hook {name:?}: termination already in progress")]
    AlreadyTerminating {
        /// Name of the rejected hook.
        name: String,
    },
}
