//! Error types for the bus gateway.

/// Errors that can occur while publishing or subscribing.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// Failed to connect to or communicate with the NATS server.
    #[error("NATS error: {0}")]
    Nats(String),

    /// An event could not be serialized for the wire.
    #[error("failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),

    /// A payload received from the wire is not a valid event.
    #[error("failed to decode event: {0}")]
    Decode(#[source] serde_json::Error),

    /// A publish did not complete within its deadline.
    #[error("publish on {topic} timed out after {timeout_ms}ms")]
    Timeout {
        /// The topic being published to.
        topic: String,
        /// The deadline that was exceeded.
        timeout_ms: u64,
    },

    /// The topic or connection has been closed.
    #[error("bus closed: {0}")]
    Closed(String),
}

/// Failure reported by an [`EventHandler`](crate::EventHandler).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("event handler failed: {message}")]
pub struct HandlerError {
    /// Description of the failure.
    pub message: String,
}

impl HandlerError {
    /// Build a handler error from any displayable cause.
    pub fn new(cause: impl core::fmt::Display) -> Self {
        Self {
            message: cause.to_string(),
        }
    }
}
