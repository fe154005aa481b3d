//! User arrival simulator.
//!
//! Creates users at jittered intervals, stores each one as `NEW`, queues
//! it, stores it again as `QUEUED`, and announces it on the bus.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `reactica-config.yaml` (or `REACTICA_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to the store
//! 4. Connect to NATS
//! 5. Clear the users cache, then run the arrival loop until Ctrl-C or the
//!    configured user limit
//! 6. Flush the bus and log the summary
//!
//! Any failure in steps 1-4, or in clearing the users cache, aborts startup
//! with a non-zero exit code before any user is generated.

mod error;

use rand::SeedableRng;
use rand::rngs::StdRng;
use reactica_bus::NatsBus;
use reactica_core::{
    CuteNameGenerator, Generator, Orchestrator, ReacticaConfig, Shutdown, telemetry,
};
use reactica_store::DragonflyPool;
use tracing::{error, info, warn};

use crate::error::GeneratorError;

#[tokio::main]
async fn main() -> Result<(), GeneratorError> {
    // 1. Load configuration.
    let (config, source) = ReacticaConfig::load()?;

    // 2. Initialize structured logging.
    telemetry::init(&config.logging);
    info!(
        source = %source,
        store_url = %config.store.url(),
        nats_url = %config.bus.nats_url,
        topic = %config.bus.topic,
        period_ms = config.generator.period_ms,
        "reactica-generator starting"
    );

    // 3. Connect to the store.
    let pool = DragonflyPool::connect(&config.store.url())
        .await
        .inspect_err(|e| error!(error = %e, "Failed to connect to store"))?;
    let users = pool.cache(&config.store.users_cache, config.store.call_policy());

    // 4. Connect to NATS.
    let bus = NatsBus::connect(&config.bus.nats_url, config.bus.publish_timeout_ms)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to connect to NATS"))?;

    // 5. Clear the users cache and run the arrival loop.
    let (names_rng, delay_rng) = match config.generator.seed {
        Some(seed) => {
            info!(seed, "Using seeded randomness");
            (StdRng::seed_from_u64(seed), StdRng::seed_from_u64(seed.wrapping_add(1)))
        }
        None => (StdRng::from_os_rng(), StdRng::from_os_rng()),
    };
    let orchestrator = Orchestrator::new(users, bus.clone(), config.bus.topic.clone());
    let mut generator = Generator::new(
        orchestrator,
        config.generator.delay_policy(),
        CuteNameGenerator::new(names_rng),
        delay_rng,
        config.generator.max_users,
    );

    let shutdown = Shutdown::new();
    let signal = shutdown.signal();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received");
                shutdown.request();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    let summary = generator.start(signal).await?;

    // 6. Flush and report.
    if let Err(e) = bus.flush().await {
        warn!(error = %e, "Failed to flush pending events");
    }
    info!(
        generated = summary.generated,
        completed = summary.completed,
        publish_failed = summary.publish_failed,
        aborted = summary.aborted,
        "reactica-generator finished"
    );
    Ok(())
}
