//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [init-completed]
//! [received] request=req-1
//! [completed] request=req-1
//! [failed] request=req-2 reason="handler: boom"
//! [deadline] request=req-3 budget=3000ms
//! [fetch-retry] attempt=1 delay=100ms reason="control endpoint unavailable: ..."
//! [runner-stopped]
//! [shutdown-requested]
//! [hook-completed] hook=connection-pool
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Intended for development and demos;
/// implement a custom [`Subscribe`] for structured logging or metrics.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::InitCompleted => println!("[init-completed]"),
            EventKind::InitFailed => {
                println!("[init-failed] reason={:?}", e.reason);
            }
            EventKind::InvocationReceived => {
                println!("[received] request={:?}", e.request_id);
            }
            EventKind::InvocationCompleted => {
                println!("[completed] request={:?}", e.request_id);
            }
            EventKind::InvocationFailed => {
                println!("[failed] request={:?} reason={:?}", e.request_id, e.reason);
            }
            EventKind::DeadlineExceeded => {
                println!(
                    "[deadline] request={:?} budget={:?}ms",
                    e.request_id, e.timeout_ms
                );
            }
            EventKind::FetchRetryScheduled => {
                println!(
                    "[fetch-retry] attempt={:?} delay={:?}ms reason={:?}",
                    e.attempt, e.delay_ms, e.reason
                );
            }
            EventKind::RunnerStopped => println!("[runner-stopped]"),
            EventKind::RunnerFailed => {
                println!("[runner-failed] reason={:?}", e.reason);
            }
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
            EventKind::HookCompleted => {
                println!("[hook-completed] hook={:?}", e.hook);
            }
            EventKind::HookFailed => {
                println!("[hook-failed] hook={:?} reason={:?}", e.hook, e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
