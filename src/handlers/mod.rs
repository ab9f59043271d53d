//! # Handler contract and adapter chain.
//!
//! Every user handler, whatever its shape, is normalized into one canonical
//! interface before the runner sees it:
//!
//! ```text
//!   ValueHandler   (sync  (In, &ctx) -> Out)  ──┐
//!   FutureHandler  (async (In, ctx)  -> Out)  ──┼──► Handler (async bytes-in/bytes-out)
//!   RawFn          (async bytes     -> bytes) ──┘         ▲
//!                                                         │
//!                                            driven by the Runner, one
//!                                            invocation at a time
//! ```
//!
//! Adapters compose by wrapping, never by inheriting: the codec layer sits
//! outermost around the user function, and there is exactly one layer of
//! deadline/cancellation handling, in the runner.

mod codec;
mod context;
mod future;
mod handler;
mod value;

pub use codec::{Codec, JsonCodec};
pub use context::{InitContext, InvocationContext};
pub use future::FutureHandler;
pub use handler::{Handler, HandlerRef, RawFn};
pub use value::ValueHandler;
