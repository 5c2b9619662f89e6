//! Codec trait and implementations for serializing/deserializing bodies.
//!
//! The server and the CLI never call `serde_json` directly. They go through
//! a [`Codec`], which keeps the choice of wire format in one place and
//! turns every serializer failure into a [`ProtocolError`].

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust values to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so a single codec value can live in shared
/// server state and be used from any Tokio worker.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// The MIME type of the bytes this codec produces.
    fn content_type(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ```rust
/// use dicebox_protocol::{Codec, JsonCodec, PlayerId, Roll};
///
/// let codec = JsonCodec;
/// let roll = Roll::new(PlayerId::from("alice"), 37);
///
/// let bytes = codec.encode(&roll).unwrap();
/// assert_eq!(bytes, br#"{"player_id":"alice","roll":37}"#);
///
/// let decoded: Roll = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, roll);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}
