//! The serialized generate-orchestrate-reschedule loop.
//!
//! The [`Generator`] waits one jittered delay, creates a user, runs its
//! chain to completion, and only then draws the next delay. At most one
//! chain is ever in flight, so arrivals are strictly sequential.
//!
//! The loop reschedules after every chain, whatever its outcome: a store
//! or bus outage costs the affected users, not the simulation. Shutdown is
//! observed only while waiting, never in the middle of a chain.
//!
//! [`Generator::start`] is the process entry point: it empties the users
//! cache first and refuses to generate anyone if that fails.

use rand::Rng;
use reactica_bus::EventBus;
use reactica_store::{KeyValueStore, StoreError};
use reactica_types::User;
use tracing::{debug, error, info};

use crate::names::NameSource;
use crate::orchestrator::{ChainOutcome, Orchestrator};
use crate::schedule::DelayPolicy;
use crate::shutdown::ShutdownSignal;

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorSummary {
    /// Users created.
    pub generated: u64,
    /// Chains that stored and published.
    pub completed: u64,
    /// Chains that stored but could not publish.
    pub publish_failed: u64,
    /// Chains aborted before publishing.
    pub aborted: u64,
}

impl GeneratorSummary {
    const fn record(&mut self, outcome: &ChainOutcome) {
        self.generated = self.generated.saturating_add(1);
        let counter = match outcome {
            ChainOutcome::Completed { .. } => &mut self.completed,
            ChainOutcome::PublishFailed { .. } => &mut self.publish_failed,
            ChainOutcome::Aborted { .. } => &mut self.aborted,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Paces user arrivals and drives one chain per arrival.
#[derive(Debug)]
pub struct Generator<S, B, N, R> {
    orchestrator: Orchestrator<S, B>,
    policy: DelayPolicy,
    names: N,
    rng: R,
    max_users: u64,
}

impl<S, B, N, R> Generator<S, B, N, R>
where
    S: KeyValueStore,
    B: EventBus,
    N: NameSource,
    R: Rng + Send,
{
    /// Create a generator.
    ///
    /// `max_users` of 0 means unbounded: the loop runs until shutdown.
    pub const fn new(
        orchestrator: Orchestrator<S, B>,
        policy: DelayPolicy,
        names: N,
        rng: R,
        max_users: u64,
    ) -> Self {
        Self {
            orchestrator,
            policy,
            names,
            rng,
            max_users,
        }
    }

    /// Empty the users cache, then [`run`](Self::run).
    ///
    /// Names are only unique within one run, so a run never starts on top
    /// of records left by an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the users cache cannot be cleared. No user
    /// is generated in that case.
    pub async fn start(
        &mut self,
        shutdown: ShutdownSignal,
    ) -> Result<GeneratorSummary, StoreError> {
        self.orchestrator
            .store()
            .clear()
            .await
            .inspect_err(|e| error!(error = %e, "Failed to clear users cache"))?;
        info!("Users cache cleared");
        Ok(self.run(shutdown).await)
    }

    /// Run until shutdown is requested or `max_users` users were created.
    pub async fn run(&mut self, mut shutdown: ShutdownSignal) -> GeneratorSummary {
        let mut summary = GeneratorSummary::default();
        info!(
            period_ms = self.policy.period_ms,
            jitter_ms = self.policy.jitter_ms,
            max_users = self.max_users,
            "Generator started"
        );

        loop {
            if self.max_users > 0 && summary.generated >= self.max_users {
                info!(generated = summary.generated, "User limit reached");
                break;
            }

            let delay = self.policy.next_delay(&mut self.rng);
            let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            debug!(delay_ms, "Next arrival scheduled");

            tokio::select! {
                biased;
                () = shutdown.requested() => {
                    info!("Shutdown requested, stopping generator");
                    break;
                }
                () = tokio::time::sleep(delay) => {}
            }

            let user = User::new(self.names.generate());
            let outcome = self.orchestrator.run_chain(user).await;
            summary.record(&outcome);
        }

        info!(
            generated = summary.generated,
            completed = summary.completed,
            publish_failed = summary.publish_failed,
            aborted = summary.aborted,
            "Generator stopped"
        );
        summary
    }
}
