//! Codec trait and implementations for turning messages into frames.
//!
//! The gateway only needs something that implements [`Codec`]; it never
//! names a wire format itself. The server is generic over the codec, so a
//! different encoding slots in without touching the handler or the
//! sessions.
//!
//! [`JsonCodec`] is the one the browser client speaks: every event is a
//! `{"event": ..., "data": ...}` object in a WebSocket text frame.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to frame bytes and decodes frame bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync`: one codec instance sits in the shared server state and
///   is used from every connection task at once, on whatever worker thread
///   Tokio picks.
/// - `'static`: the codec owns everything it needs, so it can live inside
///   the `Arc` the accept loop hands to each spawned handler.
///
/// ## Generic methods
///
/// `encode` and `decode` are generic over the message type rather than the
/// trait being generic over it. The same codec therefore reads
/// [`ClientMessage`](crate::ClientMessage) and writes
/// [`ServerMessage`](crate::ServerMessage).
///
/// `decode` asks for `DeserializeOwned` instead of `Deserialize<'de>`: the
/// decoded message must not borrow from the frame buffer, which is dropped
/// as soon as the reader loop moves on to the next frame.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails (for JSON, a
    /// map with non-string keys is the usual culprit).
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes into a value.
    ///
    /// Only the shape is checked here. Range and content rules live in
    /// [`ClientMessage::validate`](crate::ClientMessage::validate).
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes don't parse or name an
    /// event that doesn't exist.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// Output is compact JSON and always valid UTF-8, which is what lets the
/// WebSocket transport send it as a text frame.
///
/// ```rust
/// use bingo_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg: ClientMessage = codec
///     .decode(br#"{"event":"make_move","data":{"number":12}}"#)
///     .unwrap();
/// assert_eq!(msg, ClientMessage::MakeMove { number: 12 });
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
}
