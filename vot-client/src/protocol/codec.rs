//! Encode/decode helpers over the message schemas

use crate::Result;
use prost::Message;

/// Serialize a message. Infallible: encoding into a growable buffer cannot run out of space.
pub fn encode<M: Message>(message: &M) -> Vec<u8> {
    message.encode_to_vec()
}

/// Parse a message, skipping unknown fields
///
/// Fails with `Error::ProtocolDecode` on malformed or truncated input.
pub fn decode<M: Message + Default>(bytes: &[u8]) -> Result<M> {
    Ok(M::decode(bytes)?)
}
