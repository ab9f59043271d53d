//! # Asynchronous adapter: typed async functions as canonical handlers.
//!
//! [`FutureHandler`] wraps a function that may suspend before producing its
//! result. The canonical handler's asynchronous contract is preserved:
//! suspension is legal at exactly one point, awaiting the user function's
//! completion.
//!
//! If the invocation deadline elapses while the user function is still
//! running, the runner reports a deadline-exceeded failure and moves on; the
//! in-flight user call is not force-cancelled, and its eventual result is
//! discarded. Handlers that want to stop early can watch
//! [`InvocationContext::cancel`](crate::InvocationContext::cancel).
//!
//! # Example
//! ```
//! use funcvisor::{FutureHandler, HandlerRef, InvocationContext};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct Request { name: String }
//!
//! #[derive(Serialize)]
//! struct Response { greeting: String }
//!
//! let handler: HandlerRef = FutureHandler::arc(|req: Request, _ctx: InvocationContext| async move {
//!     Ok(Response { greeting: format!("hello, {}", req.name) })
//! });
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{BoxError, InvocationError};
use crate::handlers::codec::{Codec, JsonCodec};
use crate::handlers::context::InvocationContext;
use crate::handlers::handler::{Handler, HandlerRef};

/// Adapter turning a typed asynchronous function into the canonical handler.
///
/// Same composition rule as [`ValueHandler`](crate::ValueHandler):
/// the codec wraps the user function, and deadline handling stays in the
/// runner.
pub struct FutureHandler<F, Fut, C, In, Out>
where
    F: Fn(In, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, BoxError>> + Send + 'static,
    C: Codec<In, Out>,
    In: Send + 'static,
    Out: Send + 'static,
{
    func: F,
    codec: C,
    _marker: PhantomData<fn(In) -> Out>,
}

impl<F, Fut, In, Out> FutureHandler<F, Fut, JsonCodec, In, Out>
where
    F: Fn(In, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, BoxError>> + Send + 'static,
    JsonCodec: Codec<In, Out>,
    In: Send + 'static,
    Out: Send + 'static,
{
    /// Wraps the async function with the default JSON codec.
    pub fn new(func: F) -> Self {
        Self::with_codec(func, JsonCodec)
    }

    /// Wraps the async function and returns it as a shared canonical handler.
    pub fn arc(func: F) -> HandlerRef {
        Arc::new(Self::new(func))
    }
}

impl<F, Fut, C, In, Out> FutureHandler<F, Fut, C, In, Out>
where
    F: Fn(In, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, BoxError>> + Send + 'static,
    C: Codec<In, Out>,
    In: Send + 'static,
    Out: Send + 'static,
{
    /// Wraps the async function with an explicit codec.
    pub fn with_codec(func: F, codec: C) -> Self {
        Self {
            func,
            codec,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut, C, In, Out> Handler for FutureHandler<F, Fut, C, In, Out>
where
    F: Fn(In, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, BoxError>> + Send + 'static,
    C: Codec<In, Out>,
    In: Send + 'static,
    Out: Send + 'static,
{
    async fn invoke(
        &self,
        payload: Bytes,
        ctx: &InvocationContext,
    ) -> Result<Bytes, InvocationError> {
        let input = self.codec.decode(&payload)?;
        let output = (self.func)(input, ctx.clone())
            .await
            .map_err(|e| InvocationError::Handler {
                message: e.to_string(),
            })?;
        self.codec.encode(&output)
    }
}
