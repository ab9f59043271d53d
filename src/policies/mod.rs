//! # Retry and backoff policies.
//!
//! Policies shape how the runner reacts to transient control-endpoint
//! failures:
//! - [`RetryPolicy`] — bounds the number of fetch retries;
//! - [`BackoffPolicy`] — spaces the retries out;
//! - [`JitterPolicy`] — randomizes the spacing.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
