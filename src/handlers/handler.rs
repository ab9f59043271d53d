//! # Canonical handler contract and the function-backed raw adapter.
//!
//! [`Handler`] is the single invocation contract the runner drives: given the
//! opaque payload bytes and an [`InvocationContext`], asynchronously produce
//! the response bytes or an [`InvocationError`]. Every other handler shape
//! (see [`ValueHandler`](crate::ValueHandler) and
//! [`FutureHandler`](crate::FutureHandler)) wraps down to this one.
//!
//! Exactly one handler instance exists per process lifetime: it is
//! constructed once during initialize and reused, read-only, for every
//! subsequent invocation.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::InvocationError;
use crate::handlers::context::InvocationContext;

/// Shared handle to the canonical handler.
pub type HandlerRef = Arc<dyn Handler>;

/// # Canonical bytes-in/bytes-out asynchronous handler.
///
/// Implementations must be shareable (`Send + Sync`) because the same
/// instance serves every invocation for the life of the process. The runner
/// serializes invocations, so no two calls run concurrently, but the
/// instance itself is treated as opaque read-only state.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use bytes::Bytes;
/// use funcvisor::{Handler, InvocationContext, InvocationError};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Handler for Echo {
///     async fn invoke(
///         &self,
///         payload: Bytes,
///         _ctx: &InvocationContext,
///     ) -> Result<Bytes, InvocationError> {
///         Ok(payload)
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Processes one invocation payload, producing the response payload.
    async fn invoke(
        &self,
        payload: Bytes,
        ctx: &InvocationContext,
    ) -> Result<Bytes, InvocationError>;
}

impl std::fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler")
    }
}

/// # Function-backed canonical handler.
///
/// [`RawFn`] is the pass-through adapter: it wraps a function that already
/// speaks the canonical bytes-in/bytes-out asynchronous form and is used
/// directly by the runner. Use [`RawFn::arc`] for a one-liner that returns a
/// [`HandlerRef`].
///
/// # Example
/// ```
/// use bytes::Bytes;
/// use funcvisor::{HandlerRef, InvocationContext, RawFn};
///
/// let echo: HandlerRef = RawFn::arc(|payload: Bytes, _ctx: InvocationContext| async move {
///     Ok(payload)
/// });
/// ```
pub struct RawFn<F, Fut>
where
    F: Fn(Bytes, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Bytes, InvocationError>> + Send + 'static,
{
    func: F,
}

impl<F, Fut> RawFn<F, Fut>
where
    F: Fn(Bytes, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Bytes, InvocationError>> + Send + 'static,
{
    /// Creates a new function-backed handler.
    pub fn new(func: F) -> Self {
        Self { func }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(func: F) -> HandlerRef {
        Arc::new(Self::new(func))
    }
}

#[async_trait]
impl<F, Fut> Handler for RawFn<F, Fut>
where
    F: Fn(Bytes, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Bytes, InvocationError>> + Send + 'static,
{
    async fn invoke(
        &self,
        payload: Bytes,
        ctx: &InvocationContext,
    ) -> Result<Bytes, InvocationError> {
        (self.func)(payload, ctx.clone()).await
    }
}
