//! Error types for the protocol layer.
//!
//! Each crate in Cardroom defines its own error enum. A `ProtocolError`
//! always means the problem is in encoding or decoding bytes, never in
//! room or presence bookkeeping.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, missing required fields,
    /// wrong data types, or truncated bodies.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The input decoded fine but is not acceptable at the protocol level,
    /// e.g. a pushed state body that is a JSON array instead of an object.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
