//! Publish/subscribe gateway for the Reactica user pipeline.
//!
//! The generator announces every queued user on a single topic and the
//! event store listens on it. Both sides only see the [`EventBus`] and
//! [`EventHandler`] contracts:
//!
//! ```text
//! Orchestrator --publish--> EventBus --(JSON UserEvent)--> dispatch loop
//!                                                            |
//!                                       one task per message +--> EventHandler
//! ```
//!
//! Publishing is best-effort and unacknowledged. Delivery to a handler is
//! concurrent with other traffic, and a failing or panicking handler only
//! loses its own message: the subscription keeps running.
//!
//! # Modules
//!
//! - [`nats`] -- NATS backend
//! - [`memory`] -- In-process broadcast backend
//! - [`subscription`] -- Per-message dispatch and the subscription handle
//! - [`codec`] -- JSON wire encoding of [`UserEvent`]
//! - [`error`] -- Shared error types

use std::future::Future;
use std::sync::Arc;

use reactica_types::UserEvent;

pub mod codec;
pub mod error;
pub mod memory;
pub mod nats;
pub mod subscription;

pub use error::{BusError, HandlerError};
pub use memory::MemoryBus;
pub use nats::NatsBus;
pub use subscription::{DispatchStats, Subscription};

/// Topic carrying user lifecycle events.
pub const USER_EVENTS_TOPIC: &str = "user-events";

/// Receives events delivered by a subscription.
///
/// Called once per received message, possibly concurrently with other
/// calls on the same handler.
pub trait EventHandler: Send + Sync {
    /// Process one event.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] if the event could not be processed. The
    /// error is logged by the dispatch loop; the event is not redelivered.
    fn handle(&self, event: UserEvent) -> impl Future<Output = Result<(), HandlerError>> + Send;
}

/// A topic-addressed publish/subscribe bus.
pub trait EventBus: Send + Sync {
    /// Publish `event` on `topic`.
    ///
    /// Best-effort: success means the bus accepted the message, not that
    /// any subscriber received it.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if the event cannot be encoded or the bus
    /// rejects or times out the publish.
    fn publish(
        &self,
        topic: &str,
        event: &UserEvent,
    ) -> impl Future<Output = Result<(), BusError>> + Send;

    /// Start delivering events published on `topic` to `handler`.
    ///
    /// Delivery continues until the returned [`Subscription`] is
    /// unsubscribed or dropped, or the bus closes the topic.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if the subscription cannot be registered.
    fn subscribe<H>(
        &self,
        topic: &str,
        handler: Arc<H>,
    ) -> impl Future<Output = Result<Subscription, BusError>> + Send
    where
        H: EventHandler + 'static;
}
