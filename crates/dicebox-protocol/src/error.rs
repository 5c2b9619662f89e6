//! Error types for the protocol layer.
//!
//! Each dicebox crate defines its own error enum. A `ProtocolError` always
//! means the bytes or the shape of a request were wrong, never that the
//! game itself refused something. The HTTP layer relies on that split to
//! answer `400` for protocol errors and `500` for everything else.

/// Errors that can occur while encoding, decoding, or validating a body.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("{0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: an empty body, malformed JSON, or a field of the
    /// wrong type (`"num_players": "two"`). The message is the decoder's
    /// own, so clients see exactly what was wrong with their input.
    #[cfg(feature = "json")]
    #[error("{0}")]
    Decode(serde_json::Error),

    /// The request decoded fine but is unusable, e.g. an empty player id.
    #[error("{0}")]
    InvalidMessage(String),
}
