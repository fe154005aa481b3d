//! Event store for the Reactica pipeline.
//!
//! Subscribes to the user-events topic and records each received event in
//! the user-events cache under the user's name. Runs until Ctrl-C or until
//! the bus ends the subscription.

mod error;

use std::sync::Arc;

use reactica_bus::{EventBus, NatsBus};
use reactica_core::{EventPersister, ReacticaConfig, telemetry};
use reactica_store::DragonflyPool;
use tracing::{error, info, warn};

use crate::error::EventStoreError;

#[tokio::main]
async fn main() -> Result<(), EventStoreError> {
    let (config, source) = ReacticaConfig::load()?;
    telemetry::init(&config.logging);
    info!(
        source = %source,
        store_url = %config.store.url(),
        nats_url = %config.bus.nats_url,
        topic = %config.bus.topic,
        "reactica-eventstore starting"
    );

    let pool = DragonflyPool::connect(&config.store.url())
        .await
        .inspect_err(|e| error!(error = %e, "Failed to connect to store"))?;
    let events = pool.cache(&config.store.events_cache, config.store.call_policy());

    let bus = NatsBus::connect(&config.bus.nats_url, config.bus.publish_timeout_ms)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to connect to NATS"))?;
    let mut subscription = bus
        .subscribe(&config.bus.topic, Arc::new(EventPersister::new(events)))
        .await?;
    info!(
        topic = subscription.topic(),
        cache = %config.store.events_cache,
        "Listening for user events"
    );

    let interrupted = tokio::select! {
        signal = tokio::signal::ctrl_c() => Some(signal),
        () = subscription.closed() => None,
    };
    match interrupted {
        Some(Ok(())) => info!("Ctrl-C received, unsubscribing"),
        Some(Err(e)) => {
            warn!(error = %e, "Failed to listen for Ctrl-C, running until the bus closes");
            subscription.closed().await;
            warn!("Subscription ended by the bus");
        }
        None => warn!("Subscription ended by the bus"),
    }

    let stats = subscription.unsubscribe().await?;
    info!(
        received = stats.received,
        handled = stats.handled,
        failed = stats.failed,
        undecodable = stats.undecodable,
        "reactica-eventstore finished"
    );
    Ok(())
}
