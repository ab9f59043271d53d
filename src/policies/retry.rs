//! # Retry policy for transient fetch failures.
//!
//! [`RetryPolicy`] bounds how often the runner retries a failed
//! "next invocation" fetch before promoting the failure to a fatal
//! [`RuntimeError::FetchExhausted`](crate::RuntimeError::FetchExhausted).
//! Delays between retries come from the embedded [`BackoffPolicy`].
//!
//! Retries apply only to [`EndpointError::Unavailable`](crate::EndpointError::Unavailable);
//! a malformed response is never retried.

use crate::policies::backoff::BackoffPolicy;

/// Bounded retry policy for control-endpoint fetches.
///
/// `max_retries` counts retries *after* the initial attempt, so the total
/// number of fetch attempts per invocation is `max_retries + 1`.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first failed attempt.
    pub max_retries: u32,
    /// Delay schedule between retries.
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    /// Returns a policy allowing 3 retries with the default backoff.
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// Indicates whether another retry is allowed after `retries_so_far`
    /// retries have already been spent.
    pub fn allows(&self, retries_so_far: u32) -> bool {
        retries_so_far < self.max_retries
    }

    /// Computes the delay before retry number `retry` (0-indexed).
    pub fn delay(&self, retry: u32) -> std::time::Duration {
        self.backoff.next(retry)
    }
}
