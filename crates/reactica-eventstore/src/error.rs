//! Error types for the event store binary.

/// Top-level error for the event store binary.
#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: reactica_core::ConfigError,
    },

    /// The user-events cache could not be reached at startup.
    #[error("store initialization failed: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: reactica_store::StoreError,
    },

    /// The bus could not be reached, subscribed, or cleanly unsubscribed.
    #[error("bus error: {source}")]
    Bus {
        /// The underlying bus error.
        #[from]
        source: reactica_bus::BusError,
    },
}
