//! Shared type definitions for the Reactica user pipeline.
//!
//! This crate is the single source of truth for the entities that flow
//! between the generator, the key-value store, the bus, and the event
//! store. Both the producer and the consumer process depend on it, so the
//! JSON encoding defined here is the wire format on the bus and the record
//! format in the store.
//!
//! # Modules
//!
//! - [`user`] -- The simulated [`User`] and its lifecycle
//! - [`event`] -- Lifecycle announcements published on the bus

pub mod event;
pub mod user;

// Re-export all public types at crate root for convenience.
pub use event::{EventKind, UserEvent};
pub use user::{TransitionError, User, UserState};
