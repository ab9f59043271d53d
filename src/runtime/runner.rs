//! # Invocation loop and lifecycle state machine.
//!
//! [`Runner`] orchestrates two phases:
//!
//! - **initialize** — run the handler provider exactly once, producing the
//!   canonical handler or a fatal initialization error (which is posted to
//!   the control endpoint before the runner enters `Failed`);
//! - **run** — loop: fetch next invocation → invoke the handler under a
//!   deadline → report the outcome → repeat, until a stop signal or a fatal
//!   error.
//!
//! ```text
//! Uninitialized ──initialize()──► Initializing ──ok──► Ready
//!                                      │                 │ fetch
//!                                      └──err──► Failed  ▼
//!                                          ▲          Invoking ──report──► Ready (loop)
//!                                          │             │
//!                  exhausted fetch retries │             │ stop signal at
//!                  or report failure ──────┘             ▼ iteration boundary
//!                                                     Stopped
//! ```
//!
//! ## Fatal vs. recoverable
//! - fetch failures: retried with bounded backoff, then fatal;
//! - decode/encode/user-handler/deadline failures: reported per invocation,
//!   never fatal;
//! - report failures: immediately fatal (the loop cannot trust its own state
//!   if it cannot communicate outcomes).

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::client::EndpointClient;
use crate::config::RuntimeConfig;
use crate::error::{BoxError, InvocationError, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::handlers::{HandlerRef, InitContext, InvocationContext};
use crate::invocation::{FailureReport, Invocation};

/// Lifecycle states of the runner.
///
/// `Failed` is absorbing; a failed runner is never driven again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// No handler yet; `initialize` has not been called.
    Uninitialized,
    /// The handler provider is running.
    Initializing,
    /// A handler is held and the loop is between invocations.
    Ready,
    /// An invocation is in flight.
    Invoking,
    /// The stop signal was observed; the loop exited cleanly.
    Stopped,
    /// A fatal error occurred during initialize or the loop.
    Failed,
}

impl RunnerState {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerState::Uninitialized => "uninitialized",
            RunnerState::Initializing => "initializing",
            RunnerState::Ready => "ready",
            RunnerState::Invoking => "invoking",
            RunnerState::Stopped => "stopped",
            RunnerState::Failed => "failed",
        }
    }
}

/// Outcome of one fetch cycle, including its bounded retries.
enum Fetched {
    Next(Invocation),
    StopRequested,
}

/// Drives the initialize/run lifecycle against a control endpoint.
///
/// One runner processes one invocation at a time: fetch, invoke, report,
/// in order, never pipelined. The stop token may be cancelled at any time
/// from another task; the loop honors it at the next iteration boundary
/// (an in-flight invocation is always reported first).
pub struct Runner<C: EndpointClient> {
    client: Arc<C>,
    config: RuntimeConfig,
    bus: Bus,
    stop: CancellationToken,
    state: RunnerState,
}

impl<C: EndpointClient> Runner<C> {
    /// Creates a runner over the given client and configuration.
    pub fn new(config: RuntimeConfig, client: C) -> Self {
        let bus = Bus::new(config.bus_capacity);
        Self {
            client: Arc::new(client),
            config,
            bus,
            stop: CancellationToken::new(),
            state: RunnerState::Uninitialized,
        }
    }

    /// Returns the event bus for attaching subscribers.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns a clone of the stop token.
    ///
    /// Cancelling it makes the loop transition to [`RunnerState::Stopped`]
    /// at the next iteration boundary.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Runs the handler provider exactly once, producing the canonical
    /// handler.
    ///
    /// On provider failure the error is posted to the control endpoint via
    /// `report_init_error`, the runner enters [`RunnerState::Failed`], and
    /// the hosting process is expected to exit non-zero.
    pub async fn initialize<P, Fut>(&mut self, provider: P) -> Result<HandlerRef, RuntimeError>
    where
        P: FnOnce(InitContext) -> Fut,
        Fut: Future<Output = Result<HandlerRef, BoxError>>,
    {
        if self.state != RunnerState::Uninitialized {
            return Err(RuntimeError::InvalidState {
                state: self.state.as_label(),
            });
        }
        self.state = RunnerState::Initializing;

        let ctx = InitContext {
            bus: self.bus.clone(),
            config: self.config.clone(),
        };
        match provider(ctx).await {
            Ok(handler) => {
                self.state = RunnerState::Ready;
                self.bus.publish(Event::new(EventKind::InitCompleted));
                Ok(handler)
            }
            Err(e) => {
                let message = e.to_string();
                let report = FailureReport::init_failure(message.clone());
                // Best effort: the init failure itself is the primary error.
                let _ = self.client.report_init_error(&report).await;
                self.state = RunnerState::Failed;
                self.bus
                    .publish(Event::new(EventKind::InitFailed).with_reason(message.clone()));
                Err(RuntimeError::Init { message })
            }
        }
    }

    /// Drives the fetch → invoke → report loop until a stop signal or a
    /// fatal error.
    ///
    /// Returns `Ok(())` after a clean stop ([`RunnerState::Stopped`]); any
    /// `Err` leaves the runner in [`RunnerState::Failed`].
    pub async fn run(&mut self, handler: HandlerRef) -> Result<(), RuntimeError> {
        if self.state != RunnerState::Ready {
            return Err(RuntimeError::InvalidState {
                state: self.state.as_label(),
            });
        }

        loop {
            if self.stop.is_cancelled() {
                return self.stopped();
            }

            let invocation = match self.fetch_with_retry().await {
                Ok(Fetched::Next(invocation)) => invocation,
                Ok(Fetched::StopRequested) => return self.stopped(),
                Err(e) => return self.failed(e),
            };

            self.state = RunnerState::Invoking;
            self.bus.publish(
                Event::new(EventKind::InvocationReceived)
                    .with_request_id(invocation.request_id.clone()),
            );

            let ctx = InvocationContext::for_invocation(&invocation);
            let outcome = self.invoke_under_deadline(&handler, invocation, &ctx).await;

            let reported = match &outcome {
                Ok(payload) => {
                    self.client
                        .report_success(&ctx.request_id, payload.clone())
                        .await
                }
                Err(err) => {
                    self.publish_invocation_failure(&ctx.request_id, err);
                    self.client
                        .report_failure(&ctx.request_id, &FailureReport::from(err))
                        .await
                }
            };

            if let Err(e) = reported {
                return self.failed(RuntimeError::Report {
                    request_id: ctx.request_id.clone(),
                    source: e,
                });
            }
            if outcome.is_ok() {
                self.bus.publish(
                    Event::new(EventKind::InvocationCompleted).with_request_id(ctx.request_id),
                );
            }

            self.state = RunnerState::Ready;
        }
    }

    /// Fetches the next invocation, retrying transient failures within the
    /// configured retry budget. Both the long poll and the backoff sleep
    /// race against the stop token.
    async fn fetch_with_retry(&self) -> Result<Fetched, RuntimeError> {
        let retry = self.config.retry;
        let mut retries: u32 = 0;

        loop {
            let fetched = tokio::select! {
                res = self.client.next() => res,
                _ = self.stop.cancelled() => return Ok(Fetched::StopRequested),
            };

            match fetched {
                Ok(invocation) => return Ok(Fetched::Next(invocation)),
                Err(e) if e.is_retryable() && retry.allows(retries) => {
                    let delay = retry.delay(retries);
                    retries += 1;
                    self.bus.publish(
                        Event::new(EventKind::FetchRetryScheduled)
                            .with_attempt(retries)
                            .with_delay(delay)
                            .with_reason(e.to_string()),
                    );
                    tokio::select! {
                        _ = time::sleep(delay) => {}
                        _ = self.stop.cancelled() => return Ok(Fetched::StopRequested),
                    }
                }
                Err(e) => {
                    return Err(RuntimeError::FetchExhausted {
                        attempts: retries + 1,
                        source: e,
                    });
                }
            }
        }
    }

    /// Races the handler against the invocation's time budget.
    ///
    /// The budget is the event's own deadline when present, else the
    /// configured request timeout. On expiry the invocation-scoped token is
    /// cancelled and `DeadlineExceeded` returned; the user computation is
    /// not force-terminated, only its result is discarded.
    async fn invoke_under_deadline(
        &self,
        handler: &HandlerRef,
        invocation: Invocation,
        ctx: &InvocationContext,
    ) -> Result<Bytes, InvocationError> {
        let budget = invocation
            .remaining_time()
            .unwrap_or(self.config.request_timeout);

        match time::timeout(budget, handler.invoke(invocation.payload, ctx)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                ctx.cancel.cancel();
                Err(InvocationError::DeadlineExceeded { budget })
            }
        }
    }

    fn publish_invocation_failure(&self, request_id: &str, err: &InvocationError) {
        let event = match err {
            InvocationError::DeadlineExceeded { budget } => {
                Event::new(EventKind::DeadlineExceeded)
                    .with_request_id(request_id)
                    .with_timeout(*budget)
            }
            other => Event::new(EventKind::InvocationFailed)
                .with_request_id(request_id)
                .with_reason(other.as_message()),
        };
        self.bus.publish(event);
    }

    fn stopped(&mut self) -> Result<(), RuntimeError> {
        self.state = RunnerState::Stopped;
        self.bus.publish(Event::new(EventKind::RunnerStopped));
        Ok(())
    }

    fn failed(&mut self, err: RuntimeError) -> Result<(), RuntimeError> {
        self.state = RunnerState::Failed;
        self.bus
            .publish(Event::new(EventKind::RunnerFailed).with_reason(err.to_string()));
        Err(err)
    }
}
