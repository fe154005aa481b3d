//! JSON wire encoding of [`UserEvent`].
//!
//! Every backend uses the same encoding so a message published through
//! the in-memory bus is byte-for-byte what NATS would carry.

use reactica_types::UserEvent;

use crate::error::BusError;

/// Serialize an event for the wire.
///
/// # Errors
///
/// Returns [`BusError::Encode`] if serialization fails.
pub fn encode(event: &UserEvent) -> Result<Vec<u8>, BusError> {
    serde_json::to_vec(event).map_err(BusError::Encode)
}

/// Deserialize an event received from the wire.
///
/// # Errors
///
/// Returns [`BusError::Decode`] if the payload is not a valid event.
pub fn decode(payload: &[u8]) -> Result<UserEvent, BusError> {
    serde_json::from_slice(payload).map_err(BusError::Decode)
}
