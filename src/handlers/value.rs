//! # Value adapter: synchronous typed functions as canonical handlers.
//!
//! [`ValueHandler`] wraps a synchronous pure function
//! `(decoded-input, &InvocationContext) -> Result<decoded-output, _>` into the
//! canonical bytes-in/bytes-out [`Handler`]: it decodes the invocation
//! payload with its [`Codec`], invokes the function, and encodes the result.
//!
//! Decode and encode failures become invocation-scoped
//! [`InvocationError::Decode`]/[`InvocationError::Encode`] results; they are
//! reported to the control endpoint, and the loop continues.
//!
//! # Example
//! ```
//! use funcvisor::{HandlerRef, InvocationContext, ValueHandler};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct Request { name: String }
//!
//! #[derive(Serialize)]
//! struct Response { greeting: String }
//!
//! let handler: HandlerRef = ValueHandler::arc(|req: Request, _ctx: &InvocationContext| {
//!     Ok(Response { greeting: format!("hello, {}", req.name) })
//! });
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{BoxError, InvocationError};
use crate::handlers::codec::{Codec, JsonCodec};
use crate::handlers::context::InvocationContext;
use crate::handlers::handler::{Handler, HandlerRef};

/// Adapter turning a synchronous typed function into the canonical handler.
///
/// Composed by wrapping: the codec sits outermost, the function innermost.
/// Deadline handling is not duplicated here — it lives in the runner.
pub struct ValueHandler<F, C, In, Out>
where
    F: Fn(In, &InvocationContext) -> Result<Out, BoxError> + Send + Sync + 'static,
    C: Codec<In, Out>,
    In: Send + 'static,
    Out: Send + 'static,
{
    func: F,
    codec: C,
    _marker: PhantomData<fn(In) -> Out>,
}

impl<F, In, Out> ValueHandler<F, JsonCodec, In, Out>
where
    F: Fn(In, &InvocationContext) -> Result<Out, BoxError> + Send + Sync + 'static,
    JsonCodec: Codec<In, Out>,
    In: Send + 'static,
    Out: Send + 'static,
{
    /// Wraps the function with the default JSON codec.
    pub fn new(func: F) -> Self {
        Self::with_codec(func, JsonCodec)
    }

    /// Wraps the function and returns it as a shared canonical handler.
    pub fn arc(func: F) -> HandlerRef {
        Arc::new(Self::new(func))
    }
}

impl<F, C, In, Out> ValueHandler<F, C, In, Out>
where
    F: Fn(In, &InvocationContext) -> Result<Out, BoxError> + Send + Sync + 'static,
    C: Codec<In, Out>,
    In: Send + 'static,
    Out: Send + 'static,
{
    /// Wraps the function with an explicit codec.
    pub fn with_codec(func: F, codec: C) -> Self {
        Self {
            func,
            codec,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<F, C, In, Out> Handler for ValueHandler<F, C, In, Out>
where
    F: Fn(In, &InvocationContext) -> Result<Out, BoxError> + Send + Sync + 'static,
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
        let output = (self.func)(input, ctx).map_err(|e| InvocationError::Handler {
            message: e.to_string(),
        })?;
        self.codec.encode(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::Invocation;
    use std::collections::HashMap;

    fn ctx() -> InvocationContext {
        InvocationContext::for_invocation(&Invocation {
            request_id: "req-1".into(),
            payload: Bytes::new(),
            deadline_ms: None,
            metadata: HashMap::new(),
        })
    }

    #[tokio::test]
    async fn test_decodes_invokes_encodes() {
        let handler = ValueHandler::arc(|n: u32, _ctx: &InvocationContext| Ok(n * 2));
        let out = handler.invoke(Bytes::from_static(b"21"), &ctx()).await.unwrap();
        assert_eq!(&out[..], b"42");
    }

    #[tokio::test]
    async fn test_decode_failure_is_reported_not_fatal() {
        let handler = ValueHandler::arc(|n: u32, _ctx: &InvocationContext| Ok(n));
        let err = handler
            .invoke(Bytes::from_static(b"nope"), &ctx())
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "invocation_decode");
    }

    #[tokio::test]
    async fn test_encode_failure_is_reported_not_fatal() {
        // Tuple map keys make serde_json fail after the handler succeeded.
        let handler = ValueHandler::arc(|n: u32, _ctx: &InvocationContext| {
            let mut out = HashMap::new();
            out.insert((n, n), n);
            Ok(out)
        });
        let err = handler.invoke(Bytes::from_static(b"7"), &ctx()).await.unwrap_err();
        assert_eq!(err.as_label(), "invocation_encode");
    }

    #[tokio::test]
    async fn test_user_error_becomes_handler_failure() {
        let handler = ValueHandler::arc(|_n: u32, _ctx: &InvocationContext| -> Result<u32, BoxError> {
            Err("business rule violated".into())
        });
        let err = handler.invoke(Bytes::from_static(b"1"), &ctx()).await.unwrap_err();
        assert_eq!(err.as_label(), "invocation_handler");
        assert!(err.as_message().contains("business rule violated"));
    }
}
