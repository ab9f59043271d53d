//! # Runtime configuration.
//!
//! [`RuntimeConfig`] holds the immutable parameters for a run: control
//! endpoint address, per-request timeout, fetch retry policy, and event bus
//! capacity.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use funcvisor::{RuntimeConfig, RetryPolicy};
//!
//! let mut cfg = RuntimeConfig::default();
//! cfg.endpoint = "127.0.0.1:9001".to_string();
//! cfg.request_timeout = Duration::from_secs(5);
//! cfg.retry = RetryPolicy { max_retries: 5, ..RetryPolicy::default() };
//!
//! assert_eq!(cfg.retry.max_retries, 5);
//! ```

use std::time::Duration;

use crate::policies::RetryPolicy;

/// Environment variable overriding the control endpoint address.
pub const ENV_ENDPOINT: &str = "FUNCVISOR_ENDPOINT";
/// Environment variable overriding the per-request timeout (milliseconds).
pub const ENV_REQUEST_TIMEOUT_MS: &str = "FUNCVISOR_REQUEST_TIMEOUT_MS";

/// Immutable parameters for one runtime run.
///
/// Controls where invocations are fetched from, how long each request (and
/// deadline-less invocation) may take, and how transient fetch failures are
/// retried.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Control endpoint address as a `host:port` string.
    pub endpoint: String,
    /// Timeout applied to every control-endpoint request. Also the fallback
    /// invocation budget when an event carries no deadline of its own.
    pub request_timeout: Duration,
    /// Retry policy for transient fetch failures.
    pub retry: RetryPolicy,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for RuntimeConfig {
    /// Provides a default configuration:
    /// - `endpoint = "127.0.0.1:9001"`
    /// - `request_timeout = 30s`
    /// - `retry = RetryPolicy::default()` (3 retries, exponential backoff)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:9001".to_string(),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            bus_capacity: 1024,
        }
    }
}

impl RuntimeConfig {
    /// Builds a configuration from the environment, falling back to defaults.
    ///
    /// Reads [`ENV_ENDPOINT`] and [`ENV_REQUEST_TIMEOUT_MS`]; unset or
    /// unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(endpoint) = std::env::var(ENV_ENDPOINT) {
            if !endpoint.is_empty() {
                cfg.endpoint = endpoint;
            }
        }
        if let Ok(raw) = std::env::var(ENV_REQUEST_TIMEOUT_MS) {
            if let Ok(ms) = raw.parse::<u64>() {
                cfg.request_timeout = Duration::from_millis(ms);
            }
        }
        cfg
    }
}
