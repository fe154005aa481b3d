//! Error types for the generator binary.
//!
//! [`GeneratorError`] covers every failure that stops the process before
//! the arrival loop starts. Once the loop runs, failures are per-user and
//! never fatal.

/// Top-level error for the generator binary.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: reactica_core::ConfigError,
    },

    /// The users cache could not be reached or cleared at startup.
    #[error("store initialization failed: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: reactica_store::StoreError,
    },

    /// The bus could not be reached at startup.
    #[error("bus initialization failed: {source}")]
    Bus {
        /// The underlying bus error.
        #[from]
        source: reactica_bus::BusError,
    },
}
