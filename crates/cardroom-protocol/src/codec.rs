//! Codec trait and the JSON implementation.
//!
//! The caller layer (an HTTP handler, a test) never touches `serde_json`
//! directly; it goes through a [`Codec`]. Swapping the wire format means
//! adding another implementation, not touching rooms.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ProtocolError, StatePayload};

/// Encodes Rust values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// request task of the service.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or do
    /// not match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes a pushed state body, which must be an object.
    ///
    /// # Errors
    /// - [`ProtocolError::Decode`] if the body is not valid.
    /// - [`ProtocolError::InvalidMessage`] if it is valid but not an object.
    fn decode_payload(&self, data: &[u8]) -> Result<StatePayload, ProtocolError> {
        match self.decode::<serde_json::Value>(data)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(ProtocolError::InvalidMessage(format!(
                "state payload must be an object, got {}",
                kind_of(&other)
            ))),
        }
    }
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// A [`Codec`] that speaks JSON (via `serde_json`).
///
/// JSON is what browser clients poll with, and it can be read straight from
/// DevTools when debugging a stuck long poll.
///
/// ## Example
///
/// ```rust
/// use cardroom_protocol::{Codec, JsonCodec, StateSnapshot};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&StateSnapshot::initial()).unwrap();
/// let decoded: StateSnapshot = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded.version, 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
