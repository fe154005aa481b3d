//! In-process broadcast backend for the bus gateway.
//!
//! Each topic is a [`broadcast`] channel carrying the same JSON payloads
//! NATS would carry. Every published event is also kept in a publish log
//! so callers can check exactly what was announced.

use std::collections::HashMap;
use std::sync::Arc;

use reactica_types::UserEvent;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, warn};

use crate::codec;
use crate::error::BusError;
use crate::subscription::{Subscription, spawn_dispatch};
use crate::{EventBus, EventHandler};

/// Maximum number of undelivered payloads buffered per topic. A subscriber
/// that falls further behind skips the oldest payloads.
const TOPIC_CAPACITY: usize = 1024;

/// A shared in-memory bus.
///
/// Clones share topics and the publish log. Publishing to a topic nobody
/// listens on succeeds, like on a real bus.
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<Vec<u8>>>>>,
    published: Arc<Mutex<Vec<(String, UserEvent)>>>,
}

impl MemoryBus {
    /// Create a bus with no topics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event published so far, with its topic, in publish order.
    pub async fn published(&self) -> Vec<(String, UserEvent)> {
        self.published.lock().await.clone()
    }

    /// Close `topic`: current subscriptions end once they drain their
    /// buffered payloads. A later publish or subscribe reopens it.
    pub async fn close_topic(&self, topic: &str) {
        self.topics.lock().await.remove(topic);
    }

    /// The sender for `topic`, created on first use.
    async fn sender(&self, topic: &str) -> broadcast::Sender<Vec<u8>> {
        self.topics
            .lock()
            .await
            .entry(topic.to_owned())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .clone()
    }
}

impl EventBus for MemoryBus {
    async fn publish(&self, topic: &str, event: &UserEvent) -> Result<(), BusError> {
        let payload = codec::encode(event)?;
        let sender = self.sender(topic).await;
        // No receivers is not an error: the message is simply unobserved.
        let receivers = sender.send(payload).unwrap_or(0);
        self.published
            .lock()
            .await
            .push((topic.to_owned(), event.clone()));
        debug!(topic, event_id = %event.id, receivers, "published event");
        Ok(())
    }

    async fn subscribe<H>(&self, topic: &str, handler: Arc<H>) -> Result<Subscription, BusError>
    where
        H: EventHandler + 'static,
    {
        let receiver = self.sender(topic).await.subscribe();
        let task_topic = topic.to_owned();
        let payloads = futures::stream::unfold(receiver, move |mut receiver| {
            let topic = task_topic.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(payload) => return Some((payload, receiver)),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(topic, skipped, "subscriber lagged, payloads dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        });
        Ok(spawn_dispatch(topic, payloads, handler))
    }
}
