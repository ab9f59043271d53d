//! # funcvisor
//!
//! **Funcvisor** is a function-execution runtime client for Rust.
//!
//! It is the long-lived process side of a FaaS-style contract: repeatedly
//! fetch invocation events from a control endpoint, dispatch each event to a
//! user-supplied handler with a bounded deadline, report the handler's result
//! (or failure) back to the endpoint, and participate in a coordinated
//! shutdown sequence when the process is asked to terminate.
//!
//! ## Architecture
//! ```text
//!      ┌──────────────────┐        ┌───────────────────┐
//!      │  ValueHandler /  │        │   RuntimeConfig   │
//!      │  FutureHandler / │        │ (endpoint, retry, │
//!      │  RawFn (user)    │        │  request timeout) │
//!      └────────┬─────────┘        └─────────┬─────────┘
//!               ▼                            ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  Runner (invocation loop + lifecycle state machine)       │
//! │  - initialize: run handler provider exactly once          │
//! │  - run: fetch ──► invoke under deadline ──► report ──► …  │
//! │  - publishes lifecycle Events to the Bus                  │
//! └──────┬──────────────────────────┬─────────────────────────┘
//!        ▼                          ▼
//! ┌──────────────────┐     ┌──────────────────┐    ┌──────────────────┐
//! │ EndpointClient   │     │ Bus (broadcast)  │    │ Terminator       │
//! │ (HTTP, 1 round   │     │   └► listener    │    │ (named shutdown  │
//! │  trip per call)  │     │      └► Subscribe│    │  hooks, reverse  │
//! └──────────────────┘     └──────────────────┘    │  order, failures │
//!                                                  │  aggregated)     │
//!                                                  └──────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Uninitialized ─► Initializing ─► Ready ─► Invoking ─► Ready ─► … ─► Stopped
//!                       │                      │
//!                       └──────► Failed ◄──────┘
//! ```
//! - Per-invocation failures (decode, encode, user error, deadline) are
//!   reported to the control endpoint and the loop continues.
//! - Transient fetch failures are retried with bounded backoff, then fatal.
//! - Report failures are immediately fatal.
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------------|---------------------------------------------|
//! | **Handlers**      | Register sync, async, or raw bytes handlers behind one contract.  | [`Handler`], [`ValueHandler`], [`FutureHandler`], [`RawFn`] |
//! | **Invocation loop**| Fetch/invoke/report with deadline racing and retry policy.       | [`Runner`], [`RunnerState`]                 |
//! | **Endpoint client**| HTTP client for the control endpoint, one round trip per call.   | [`EndpointClient`], [`HttpEndpointClient`]  |
//! | **Shutdown**      | Named hooks, reverse order, aggregate failure reporting.          | [`Terminator`], [`TerminationError`]        |
//! | **Policies**      | Bounded retries and backoff for transient fetch failures.         | [`RetryPolicy`], [`BackoffPolicy`]          |
//! | **Observability** | Lifecycle events over a broadcast bus.                            | [`Event`], [`Bus`], [`Subscribe`]           |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use funcvisor::{
//!     HttpEndpointClient, InvocationContext, Runner, RuntimeConfig, Terminator, ValueHandler,
//! };
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct Request { name: String }
//!
//! #[derive(Serialize)]
//! struct Response { greeting: String }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RuntimeConfig::from_env();
//!     let client = HttpEndpointClient::new(&config)?;
//!     let mut runner = Runner::new(config, client);
//!
//!     let terminator = Terminator::with_bus(runner.bus().clone());
//!     terminator.register("flush-caches", || async { Ok(()) })?;
//!
//!     let handler = runner
//!         .initialize(|_ctx| async {
//!             Ok(ValueHandler::arc(|req: Request, _ctx: &InvocationContext| {
//!                 Ok(Response { greeting: format!("hello, {}", req.name) })
//!             }))
//!         })
//!         .await?;
//!
//!     let stop = runner.stop_token();
//!     tokio::spawn(async move {
//!         let _ = funcvisor::wait_for_shutdown_signal().await;
//!         stop.cancel();
//!     });
//!
//!     let result = runner.run(handler).await;
//!     if let Some(err) = terminator.terminate().await {
//!         eprintln!("{}", err.as_message());
//!     }
//!     result?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod events;
mod handlers;
mod invocation;
mod os_signals;
mod policies;
mod runtime;
mod subscribers;

pub mod client;

// ---- Public re-exports ----

pub use client::{EndpointClient, HttpEndpointClient};
pub use config::{RuntimeConfig, ENV_ENDPOINT, ENV_REQUEST_TIMEOUT_MS};
pub use error::{
    BoxError, EndpointError, HookFailure, InvocationError, RegisterError, RuntimeError,
    TerminationError,
};
pub use events::{Bus, Event, EventKind};
pub use handlers::{
    Codec, FutureHandler, Handler, HandlerRef, InitContext, InvocationContext, JsonCodec, RawFn,
    ValueHandler,
};
pub use invocation::{FailureReport, Invocation};
pub use os_signals::wait_for_shutdown_signal;
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use runtime::{Runner, RunnerState, Terminator};
pub use subscribers::{spawn_listener, Subscribe};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
