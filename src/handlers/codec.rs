//! # Payload codec seam for the value adapters.
//!
//! The core treats payloads as opaque bytes; only the value adapters need a
//! concrete encoding. [`Codec`] is that seam, and [`JsonCodec`] the default
//! implementation. Codec failures surface as invocation-scoped
//! [`InvocationError::Decode`]/[`InvocationError::Encode`] — they are
//! reported to the control endpoint and never kill the loop.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::InvocationError;

/// Converts between opaque payload bytes and the value types a wrapped
/// handler works with.
pub trait Codec<In, Out>: Send + Sync + 'static {
    /// Decodes an invocation payload into the handler's input type.
    fn decode(&self, payload: &[u8]) -> Result<In, InvocationError>;

    /// Encodes the handler's output into a response payload.
    fn encode(&self, value: &Out) -> Result<Bytes, InvocationError>;
}

/// JSON codec backed by serde_json.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl<In, Out> Codec<In, Out> for JsonCodec
where
    In: DeserializeOwned + Send + 'static,
    Out: Serialize + Send + 'static,
{
    fn decode(&self, payload: &[u8]) -> Result<In, InvocationError> {
        serde_json::from_slice(payload).map_err(|e| InvocationError::Decode {
            message: e.to_string(),
        })
    }

    fn encode(&self, value: &Out) -> Result<Bytes, InvocationError> {
        let encoded = serde_json::to_vec(value).map_err(|e| InvocationError::Encode {
            message: e.to_string(),
        })?;
        Ok(Bytes::from(encoded))
    }
}
