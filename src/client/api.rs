//! # Control-endpoint wire contract.
//!
//! The control endpoint follows the Lambda-style runtime interface:
//!
//! - `GET  /{version}/runtime/invocation/next` — long-poll the next invocation
//! - `POST /{version}/runtime/invocation/{id}/response` — post a success payload
//! - `POST /{version}/runtime/invocation/{id}/error` — post a failure report
//! - `POST /{version}/runtime/init/error` — post an initialization failure
//!
//! The request id, absolute deadline, and trace metadata arrive as response
//! headers on `next`; the body is the opaque invocation payload.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::EndpointError;
use crate::invocation::Invocation;

/// API version segment of every endpoint path.
pub const API_VERSION: &str = "2018-06-01";

/// Response header carrying the invocation request id (required).
pub const HEADER_REQUEST_ID: &str = "lambda-runtime-aws-request-id";
/// Response header carrying the absolute deadline in epoch milliseconds.
pub const HEADER_DEADLINE_MS: &str = "lambda-runtime-deadline-ms";
/// Request header carrying the failure kind when posting an error report.
pub const HEADER_ERROR_TYPE: &str = "lambda-runtime-function-error-type";

/// Prefix of response headers forwarded into [`Invocation::metadata`].
pub const METADATA_HEADER_PREFIX: &str = "lambda-runtime-";

/// Returns the base URL for an endpoint address (`host:port`).
pub fn base_url(endpoint: &str) -> String {
    format!("http://{endpoint}/{API_VERSION}/runtime")
}

/// Builds an [`Invocation`] from the parts of a `next` response.
///
/// The request id header is required; the deadline header is optional but
/// must parse as `u64` when present. All other `lambda-runtime-*` headers
/// are forwarded as metadata, keyed by lowercase header name.
pub fn parse_invocation(
    headers: &reqwest::header::HeaderMap,
    payload: Bytes,
) -> Result<Invocation, EndpointError> {
    let request_id = headers
        .get(HEADER_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| EndpointError::MalformedResponse {
            detail: format!("missing or invalid {HEADER_REQUEST_ID} header"),
        })?;

    let deadline_ms = match headers.get(HEADER_DEADLINE_MS) {
        None => None,
        Some(v) => {
            let parsed = v.to_str().ok().and_then(|s| s.parse::<u64>().ok());
            match parsed {
                Some(ms) => Some(ms),
                None => {
                    return Err(EndpointError::MalformedResponse {
                        detail: format!("unparsable {HEADER_DEADLINE_MS} header"),
                    });
                }
            }
        }
    };

    let mut metadata = HashMap::new();
    for (name, value) in headers {
        let name = name.as_str();
        if name == HEADER_REQUEST_ID || name == HEADER_DEADLINE_MS {
            continue;
        }
        if name.starts_with(METADATA_HEADER_PREFIX) {
            if let Ok(value) = value.to_str() {
                metadata.insert(name.to_string(), value.to_string());
            }
        }
    }

    Ok(Invocation {
        request_id,
        payload,
        deadline_ms,
        metadata,
    })
}
