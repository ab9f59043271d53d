//! # HTTP implementation of the control-endpoint client.
//!
//! [`HttpEndpointClient`] issues one network round trip per call, with the
//! configured per-request timeout, and performs no retries and no caching.
//! Retry policy for transient failures lives in the runner, not here.
//!
//! ## Error mapping
//! - connect failures, request timeouts, body-read failures, 5xx statuses
//!   → [`EndpointError::Unavailable`] (retryable by the runner)
//! - other non-2xx statuses, missing/invalid protocol headers
//!   → [`EndpointError::MalformedResponse`] (fatal)

use async_trait::async_trait;
use bytes::Bytes;

use crate::client::api;
use crate::client::EndpointClient;
use crate::config::RuntimeConfig;
use crate::error::EndpointError;
use crate::invocation::{FailureReport, Invocation};

/// reqwest-backed control-endpoint client.
pub struct HttpEndpointClient {
    http: reqwest::Client,
    base: String,
}

impl HttpEndpointClient {
    /// Creates a client for the configured endpoint address, applying the
    /// configured per-request timeout to every call.
    pub fn new(config: &RuntimeConfig) -> Result<Self, EndpointError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EndpointError::Unavailable {
                reason: format!("building http client: {e}"),
            })?;
        Ok(Self {
            http,
            base: api::base_url(&config.endpoint),
        })
    }

    fn transport_error(e: reqwest::Error) -> EndpointError {
        let reason = if e.is_timeout() {
            "request timed out".to_string()
        } else if e.is_connect() {
            format!("connect failed: {e}")
        } else {
            e.to_string()
        };
        EndpointError::Unavailable { reason }
    }

    /// Maps a non-2xx status: 5xx is a transient server condition, anything
    /// else means the endpoint rejected the request.
    fn status_error(context: &str, status: reqwest::StatusCode) -> EndpointError {
        if status.is_server_error() {
            EndpointError::Unavailable {
                reason: format!("{context} returned {status}"),
            }
        } else {
            EndpointError::MalformedResponse {
                detail: format!("{context} returned {status}"),
            }
        }
    }
}

#[async_trait]
impl EndpointClient for HttpEndpointClient {
    async fn next(&self) -> Result<Invocation, EndpointError> {
        let url = format!("{}/invocation/next", self.base);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::status_error("next", status));
        }

        let headers = resp.headers().clone();
        let payload = resp.bytes().await.map_err(Self::transport_error)?;
        api::parse_invocation(&headers, payload)
    }

    async fn report_success(
        &self,
        request_id: &str,
        payload: Bytes,
    ) -> Result<(), EndpointError> {
        let url = format!("{}/invocation/{request_id}/response", self.base);
        let resp = self
            .http
            .post(&url)
            .body(payload)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::status_error("response", status));
        }
        Ok(())
    }

    async fn report_failure(
        &self,
        request_id: &str,
        report: &FailureReport,
    ) -> Result<(), EndpointError> {
        let url = format!("{}/invocation/{request_id}/error", self.base);
        let resp = self
            .http
            .post(&url)
            .header(api::HEADER_ERROR_TYPE, &report.kind)
            .json(report)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::status_error("error", status));
        }
        Ok(())
    }

    async fn report_init_error(&self, report: &FailureReport) -> Result<(), EndpointError> {
        let url = format!("{}/init/error", self.base);
        let resp = self
            .http
            .post(&url)
            .header(api::HEADER_ERROR_TYPE, &report.kind)
            .json(report)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::status_error("init/error", status));
        }
        Ok(())
    }
}
