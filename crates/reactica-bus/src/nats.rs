//! NATS backend for the bus gateway.
//!
//! Topics map one-to-one to NATS subjects. Publishing hands the encoded
//! event to the client's outbound queue without waiting for a server
//! acknowledgment; the publish timeout only guards against a full queue on
//! a stalled connection.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt as _;
use reactica_types::UserEvent;
use tracing::{debug, info};

use crate::codec;
use crate::error::BusError;
use crate::subscription::{Subscription, spawn_dispatch};
use crate::{EventBus, EventHandler};

/// NATS client wrapper for the user pipeline.
///
/// Manages a single NATS connection; clones share it.
#[derive(Clone)]
pub struct NatsBus {
    client: async_nats::Client,
    publish_timeout_ms: u64,
}

impl NatsBus {
    /// Connect to a NATS server.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Nats`] if the connection cannot be established.
    pub async fn connect(url: &str, publish_timeout_ms: u64) -> Result<Self, BusError> {
        info!(url = url, "connecting to NATS server");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| BusError::Nats(format!("failed to connect to {url}: {e}")))?;
        info!("NATS connection established");
        Ok(Self {
            client,
            publish_timeout_ms,
        })
    }

    /// Flush all pending messages to the NATS server.
    ///
    /// Called on shutdown so the last announcements are not lost with the
    /// outbound queue.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Nats`] if the flush operation fails.
    pub async fn flush(&self) -> Result<(), BusError> {
        self.client
            .flush()
            .await
            .map_err(|e| BusError::Nats(format!("flush failed: {e}")))
    }
}

impl std::fmt::Debug for NatsBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsBus")
            .field("connection_state", &self.client.connection_state())
            .field("publish_timeout_ms", &self.publish_timeout_ms)
            .finish()
    }
}

impl EventBus for NatsBus {
    async fn publish(&self, topic: &str, event: &UserEvent) -> Result<(), BusError> {
        let payload = codec::encode(event)?;
        debug!(
            subject = topic,
            event_id = %event.id,
            kind = ?event.kind,
            identity = event.identity(),
            "publishing event"
        );
        let publish = self.client.publish(topic.to_owned(), payload.into());
        match tokio::time::timeout(Duration::from_millis(self.publish_timeout_ms), publish).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(BusError::Nats(format!("failed to publish to {topic}: {e}"))),
            Err(_elapsed) => Err(BusError::Timeout {
                topic: topic.to_owned(),
                timeout_ms: self.publish_timeout_ms,
            }),
        }
    }

    async fn subscribe<H>(&self, topic: &str, handler: Arc<H>) -> Result<Subscription, BusError>
    where
        H: EventHandler + 'static,
    {
        debug!(subject = topic, "subscribing");
        let subscriber = self
            .client
            .subscribe(topic.to_owned())
            .await
            .map_err(|e| BusError::Nats(format!("failed to subscribe to {topic}: {e}")))?;
        info!(subject = topic, "subscribed");
        let payloads = subscriber.map(|message| message.payload);
        Ok(spawn_dispatch(topic, payloads, handler))
    }
}
