//! # Control-endpoint client.
//!
//! The [`EndpointClient`] trait is the runner's view of the control endpoint:
//! fetch the next invocation, post an outcome, post an initialization error.
//! [`HttpEndpointClient`] is the HTTP implementation; tests may substitute
//! their own.
//!
//! Every call is one network round trip carrying the configured per-request
//! timeout. The client never retries internally — retry policy is a runner
//! decision (see [`RetryPolicy`](crate::RetryPolicy)).

mod http;

pub mod api;

pub use http::HttpEndpointClient;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::EndpointError;
use crate::invocation::{FailureReport, Invocation};

/// Contract for talking to the control endpoint.
#[async_trait]
pub trait EndpointClient: Send + Sync + 'static {
    /// Blocks (asynchronously) until the endpoint returns the next invocation
    /// or the request times out.
    ///
    /// Fails with [`EndpointError::Unavailable`] on timeout or transport
    /// error; the caller decides whether and how to retry.
    async fn next(&self) -> Result<Invocation, EndpointError>;

    /// Posts the success payload for a completed invocation.
    async fn report_success(&self, request_id: &str, payload: Bytes)
        -> Result<(), EndpointError>;

    /// Posts the failure report for a failed invocation.
    async fn report_failure(
        &self,
        request_id: &str,
        report: &FailureReport,
    ) -> Result<(), EndpointError>;

    /// Posts an initialization failure. Used at most once per process; the
    /// process is expected to exit afterwards.
    async fn report_init_error(&self, report: &FailureReport) -> Result<(), EndpointError>;
}
