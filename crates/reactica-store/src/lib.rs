//! Key-value store gateway for the Reactica user pipeline.
//!
//! The generator keeps each user's current lifecycle record in the `users`
//! cache; the event store keeps the last event per user in the
//! `userevents` cache. Both go through the [`KeyValueStore`] contract so
//! the pipeline never sees connection management or wire formats.
//!
//! # Backends
//!
//! ```text
//! DragonflyPool (one fred client, shared)
//!     |
//!     +-- cache("users")      --> DragonflyCache  (hash `users`)
//!     +-- cache("userevents") --> DragonflyCache  (hash `userevents`)
//!
//! MemoryStore (in-process BTreeMap, tests and local runs)
//! ```
//!
//! # Modules
//!
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) backend
//! - [`memory`] -- In-process backend
//! - [`policy`] -- Timeout and retry policy applied by the `Dragonfly` backend
//! - [`error`] -- Shared error types

use std::future::Future;

pub mod dragonfly;
pub mod error;
pub mod memory;
pub mod policy;

// Re-export primary types for convenience.
pub use dragonfly::{DragonflyCache, DragonflyPool};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use policy::CallPolicy;

/// Asynchronous string key-value store scoped to one named cache.
///
/// Writes are last-writer-wins per key: once [`put`](Self::put) resolves
/// successfully, any reader of the same cache observes that value (or a
/// later one). Timeouts and retries are the implementation's business; a
/// timeout surfaces as [`StoreError::Timeout`] like any other failure.
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, overwriting any existing value.
    fn put(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Remove every entry of the cache.
    fn clear(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
