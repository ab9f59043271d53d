//! # Runtime events emitted by the invocation loop.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Initialization events**: handler construction outcome
//! - **Invocation events**: per-invocation flow (received, completed, failed, deadline)
//! - **Loop events**: fetch retries and terminal runner states
//! - **Shutdown events**: termination start and per-hook outcomes
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! request ids, attempt counts, and backoff delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use funcvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::InvocationFailed)
//!     .with_request_id("req-42")
//!     .with_reason("handler: boom");
//!
//! assert_eq!(ev.kind, EventKind::InvocationFailed);
//! assert_eq!(ev.request_id.as_deref(), Some("req-42"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Initialization events ===
    /// Handler construction succeeded; the runner is ready to loop.
    ///
    /// Sets: `at`, `seq`
    InitCompleted,

    /// Handler construction failed; the runner is entering `Failed`.
    ///
    /// Sets: `reason`, `at`, `seq`
    InitFailed,

    // === Invocation events ===
    /// An invocation was fetched from the control endpoint.
    ///
    /// Sets: `request_id`, `at`, `seq`
    InvocationReceived,

    /// The handler succeeded and the result was reported.
    ///
    /// Sets: `request_id`, `at`, `seq`
    InvocationCompleted,

    /// The handler failed (decode, encode, or user error); the failure was
    /// reported and the loop continues.
    ///
    /// Sets: `request_id`, `reason`, `at`, `seq`
    InvocationFailed,

    /// The handler did not finish within the invocation deadline.
    ///
    /// Sets: `request_id`, `timeout_ms`, `at`, `seq`
    DeadlineExceeded,

    // === Loop events ===
    /// A fetch failed with a retryable error; the next attempt is scheduled.
    ///
    /// Sets: `attempt`, `delay_ms`, `reason`, `at`, `seq`
    FetchRetryScheduled,

    /// The runner observed the stop signal and left the loop cleanly.
    ///
    /// Sets: `at`, `seq`
    RunnerStopped,

    /// The runner hit a fatal error and is entering `Failed`.
    ///
    /// Sets: `reason`, `at`, `seq`
    RunnerFailed,

    // === Shutdown events ===
    /// Termination started; registered hooks are about to run.
    ///
    /// Sets: `at`, `seq`
    ShutdownRequested,

    /// A shutdown hook completed cleanly.
    ///
    /// Sets: `hook`, `at`, `seq`
    HookCompleted,

    /// A shutdown hook failed; the remaining hooks still run.
    ///
    /// Sets: `hook`, `reason`, `at`, `seq`
    HookFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Request id of the invocation, if applicable.
    pub request_id: Option<Arc<str>>,
    /// Fetch attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Backoff delay before the next fetch attempt (ms).
    pub delay_ms: Option<u32>,
    /// Invocation time budget that was exceeded (ms).
    pub timeout_ms: Option<u32>,
    /// Name of the shutdown hook, if applicable.
    pub hook: Option<Arc<str>>,
    /// Human-readable reason (error messages, retry causes).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            request_id: None,
            attempt: None,
            delay_ms: None,
            timeout_ms: None,
            hook: None,
            reason: None,
        }
    }

    /// Attaches a request id.
    #[inline]
    pub fn with_request_id(mut self, id: impl Into<Arc<str>>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a shutdown hook name.
    #[inline]
    pub fn with_hook(mut self, name: impl Into<Arc<str>>) -> Self {
        self.hook = Some(name.into());
        self
    }

    /// Attaches a fetch attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches the exceeded time budget (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }
}
