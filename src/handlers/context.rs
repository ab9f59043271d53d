//! # Initialization and per-invocation contexts.
//!
//! [`InitContext`] exists only for the duration of the initialize phase; it
//! gives the handler provider access to the event bus and a read-only view
//! of the configuration. Anything a handler needs later must be captured by
//! the closures it constructs.
//!
//! [`InvocationContext`] is created fresh for every invocation and destroyed
//! when the invocation completes or times out. It carries the invocation's
//! identity, deadline, metadata, and a deadline-aware cancellation token.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::RuntimeConfig;
use crate::events::Bus;
use crate::invocation::Invocation;

/// Facilities available while the handler is being constructed.
#[derive(Clone)]
pub struct InitContext {
    /// Event bus for publishing from user code during startup.
    pub bus: Bus,
    /// Read-only view of the run configuration.
    pub config: RuntimeConfig,
}

/// Per-invocation context handed to the canonical handler.
///
/// Cloning is cheap; the metadata map is shared behind an `Arc`.
#[derive(Clone)]
pub struct InvocationContext {
    /// Request id of the invocation being processed.
    pub request_id: String,
    /// Absolute deadline in epoch milliseconds, if the event carried one.
    pub deadline_ms: Option<u64>,
    /// Trace/context metadata forwarded from the control endpoint.
    pub metadata: Arc<HashMap<String, String>>,
    /// Cancelled by the runner when the invocation deadline elapses.
    ///
    /// Handlers that poll this token can stop early; handlers that ignore it
    /// keep running, but their eventual result is discarded.
    pub cancel: CancellationToken,
}

impl InvocationContext {
    /// Builds the context for one invocation.
    pub(crate) fn for_invocation(invocation: &Invocation) -> Self {
        Self {
            request_id: invocation.request_id.clone(),
            deadline_ms: invocation.deadline_ms,
            metadata: Arc::new(invocation.metadata.clone()),
            cancel: CancellationToken::new(),
        }
    }

    /// Returns the time remaining until the invocation deadline, if any.
    ///
    /// Same clock and clamping as [`Invocation::remaining_time`].
    pub fn remaining_time(&self) -> Option<Duration> {
        crate::invocation::remaining_from_deadline(self.deadline_ms)
    }
}
