//! Per-message dispatch and the subscription handle.
//!
//! [`spawn_dispatch`] turns a stream of raw payloads into handler calls.
//! Each decoded event is handled on its own task inside a [`JoinSet`], so a
//! slow store write for one user never delays another, and a handler that
//! errors or panics is reported and forgotten.
//!
//! Stopping a subscription stops intake first, then waits for every
//! in-flight handler to finish. A handler is never cut off mid-write.

use std::sync::Arc;

use futures::{Stream, StreamExt as _};
use reactica_types::UserEvent;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::EventHandler;
use crate::codec;
use crate::error::{BusError, HandlerError};

/// Counters collected by one subscription over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Payloads received from the bus.
    pub received: u64,
    /// Payloads that were not valid events.
    pub undecodable: u64,
    /// Events the handler processed successfully.
    pub handled: u64,
    /// Events the handler rejected or panicked on.
    pub failed: u64,
}

/// Handle to a running subscription.
///
/// Dropping the handle stops intake; in-flight handlers still finish in
/// the background. Use [`unsubscribe`](Self::unsubscribe) to stop and wait
/// for them.
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    stop: watch::Sender<bool>,
    finished: watch::Receiver<bool>,
    task: JoinHandle<DispatchStats>,
}

impl Subscription {
    /// The subscribed topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait until the bus ends the subscription on its own (connection
    /// lost, topic closed).
    ///
    /// Cancel-safe: it can be raced against a shutdown signal and called
    /// again afterwards.
    pub async fn closed(&mut self) {
        // An error means the dispatch task is gone, which is also "closed".
        let _ = self.finished.wait_for(|done| *done).await;
    }

    /// Stop intake, wait for in-flight handlers, and return the counters.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Closed`] if the dispatch task itself panicked.
    pub async fn unsubscribe(self) -> Result<DispatchStats, BusError> {
        // Ignored: the task may already have exited.
        let _ = self.stop.send(true);
        self.task
            .await
            .map_err(|e| BusError::Closed(format!("dispatch task for {} failed: {e}", self.topic)))
    }
}

/// Identifies a dispatched event in logs after it has been moved into
/// its handler.
#[derive(Debug, Clone)]
struct EventRef {
    id: Uuid,
    identity: String,
}

impl EventRef {
    fn of(event: &UserEvent) -> Self {
        Self {
            id: event.id,
            identity: event.identity().to_owned(),
        }
    }
}

/// Spawn the dispatch loop for `payloads` and return its handle.
pub(crate) fn spawn_dispatch<S, P, H>(topic: &str, payloads: S, handler: Arc<H>) -> Subscription
where
    S: Stream<Item = P> + Send + 'static,
    P: AsRef<[u8]> + Send + 'static,
    H: EventHandler + 'static,
{
    let (stop_tx, stop_rx) = watch::channel(false);
    let (finished_tx, finished_rx) = watch::channel(false);
    let task_topic = topic.to_owned();

    let task = tokio::spawn(async move {
        let stats = run_dispatch(&task_topic, payloads, handler, stop_rx).await;
        info!(
            topic = task_topic,
            received = stats.received,
            handled = stats.handled,
            failed = stats.failed,
            undecodable = stats.undecodable,
            "subscription closed"
        );
        // Ignored: nobody may be waiting on `closed()`.
        let _ = finished_tx.send(true);
        stats
    });

    Subscription {
        topic: topic.to_owned(),
        stop: stop_tx,
        finished: finished_rx,
        task,
    }
}

/// The dispatch loop body.
async fn run_dispatch<S, P, H>(
    topic: &str,
    payloads: S,
    handler: Arc<H>,
    mut stop: watch::Receiver<bool>,
) -> DispatchStats
where
    S: Stream<Item = P> + Send + 'static,
    P: AsRef<[u8]> + Send + 'static,
    H: EventHandler + 'static,
{
    let mut payloads = std::pin::pin!(payloads);
    let mut in_flight: JoinSet<(EventRef, Result<(), HandlerError>)> = JoinSet::new();
    let mut stats = DispatchStats::default();

    loop {
        tokio::select! {
            // Both an explicit stop and a dropped handle end intake.
            _ = stop.changed() => break,
            next = payloads.next() => {
                let Some(payload) = next else {
                    debug!(topic, "payload stream ended");
                    break;
                };
                stats.received = stats.received.saturating_add(1);
                match codec::decode(payload.as_ref()) {
                    Ok(event) => {
                        let handler = Arc::clone(&handler);
                        let event_ref = EventRef::of(&event);
                        debug!(
                            topic,
                            event_id = %event_ref.id,
                            identity = event_ref.identity,
                            "dispatching event"
                        );
                        in_flight.spawn(async move {
                            let result = handler.handle(event).await;
                            (event_ref, result)
                        });
                    }
                    Err(e) => {
                        stats.undecodable = stats.undecodable.saturating_add(1);
                        warn!(topic, error = %e, "failed to decode event, skipping");
                    }
                }
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                record(topic, joined, &mut stats);
            }
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        record(topic, joined, &mut stats);
    }
    stats
}

/// Fold one finished handler task into the counters, logging failures.
fn record(
    topic: &str,
    joined: Result<(EventRef, Result<(), HandlerError>), tokio::task::JoinError>,
    stats: &mut DispatchStats,
) {
    match joined {
        Ok((_, Ok(()))) => {
            stats.handled = stats.handled.saturating_add(1);
        }
        Ok((event_ref, Err(e))) => {
            stats.failed = stats.failed.saturating_add(1);
            warn!(
                topic,
                event_id = %event_ref.id,
                identity = event_ref.identity,
                error = %e,
                "event handler failed"
            );
        }
        Err(e) => {
            stats.failed = stats.failed.saturating_add(1);
            error!(topic, error = %e, "event handler task panicked");
        }
    }
}
