//! Error types for the store gateway.
//!
//! All errors are propagated via [`StoreError`] which wraps the underlying
//! [`fred`] errors with context about which operation failed.

/// Errors that can occur in the store gateway.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A store operation did not complete within its deadline.
    #[error("store operation `{operation}` timed out after {timeout_ms}ms")]
    Timeout {
        /// The operation that timed out (`put`, `get`, `clear`).
        operation: &'static str,
        /// The deadline that was exceeded.
        timeout_ms: u64,
    },

    /// The store cannot serve requests right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
