//! The per-user lifecycle chain.
//!
//! For every generated user the [`Orchestrator`] runs four strictly
//! sequential stages:
//!
//! 1. write the `NEW` record to the users cache
//! 2. move the user to `QUEUED`
//! 3. overwrite the record with the `QUEUED` user
//! 4. publish a `USER_QUEUED` event
//!
//! A stage starts only after the previous one succeeded. A failure in
//! stages 1-3 aborts the chain and nothing is published. A publish failure
//! is reported but the `QUEUED` record stays: the store is the source of
//! truth and the event is best-effort.

use reactica_bus::{BusError, EventBus};
use reactica_store::{KeyValueStore, StoreError};
use reactica_types::{TransitionError, User, UserEvent, UserState};
use tracing::{debug, error, info, warn};

/// The stage of the chain that was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStage {
    /// Writing the `NEW` record.
    WritingNew,
    /// Applying the queue transition.
    Transitioning,
    /// Overwriting the record with the `QUEUED` user.
    WritingQueued,
    /// Publishing the `USER_QUEUED` event.
    Publishing,
}

impl core::fmt::Display for ChainStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::WritingNew => "write-new",
            Self::Transitioning => "transition",
            Self::WritingQueued => "write-queued",
            Self::Publishing => "publish",
        };
        f.write_str(label)
    }
}

/// Why a chain was aborted before publishing.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The user record could not be serialized.
    #[error("failed to encode user record: {0}")]
    Encode(#[from] serde_json::Error),

    /// The users cache rejected or timed out a write.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The lifecycle transition was refused.
    #[error("transition error: {0}")]
    Transition(#[from] TransitionError),
}

/// How one chain ended.
#[derive(Debug)]
pub enum ChainOutcome {
    /// Both records written and the event published.
    Completed {
        /// The user in its final `QUEUED` state.
        user: User,
    },
    /// Both records written, but the event was not published.
    PublishFailed {
        /// The user in its final `QUEUED` state.
        user: User,
        /// The bus failure.
        error: BusError,
    },
    /// The chain stopped before publishing.
    Aborted {
        /// Name of the user.
        name: String,
        /// The stage that failed.
        stage: ChainStage,
        /// The failure.
        error: ChainError,
    },
}

impl ChainOutcome {
    /// Whether every stage succeeded.
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Name of the user the chain ran for.
    pub fn name(&self) -> &str {
        match self {
            Self::Completed { user } | Self::PublishFailed { user, .. } => &user.name,
            Self::Aborted { name, .. } => name,
        }
    }

    /// State of the last record written to the users cache, if any.
    pub const fn stored_state(&self) -> Option<UserState> {
        match self {
            Self::Completed { .. } | Self::PublishFailed { .. } => Some(UserState::Queued),
            Self::Aborted {
                stage: ChainStage::WritingNew,
                ..
            } => None,
            Self::Aborted { .. } => Some(UserState::New),
        }
    }
}

/// Runs the lifecycle chain against a users cache and a bus.
#[derive(Debug)]
pub struct Orchestrator<S, B> {
    store: S,
    bus: B,
    topic: String,
}

impl<S: KeyValueStore, B: EventBus> Orchestrator<S, B> {
    /// Create an orchestrator writing to `store` and publishing on `topic`.
    pub fn new(store: S, bus: B, topic: impl Into<String>) -> Self {
        Self {
            store,
            bus,
            topic: topic.into(),
        }
    }

    /// The users cache chains write to.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Run the full chain for a freshly generated `NEW` user.
    ///
    /// Never fails: every failure is logged and reported in the returned
    /// [`ChainOutcome`].
    pub async fn run_chain(&self, user: User) -> ChainOutcome {
        let name = user.name.clone();

        if let Err(error) = self.write(&user).await {
            error!(user = %name, stage = %ChainStage::WritingNew, error = %error, "Chain aborted");
            return ChainOutcome::Aborted {
                name,
                stage: ChainStage::WritingNew,
                error,
            };
        }
        info!(user = %name, state = %user.state, "Stored user");

        let queued = match user.transition_to_queued() {
            Ok(queued) => queued,
            Err(e) => {
                error!(
                    user = %name,
                    stage = %ChainStage::Transitioning,
                    error = %e,
                    "Chain aborted"
                );
                return ChainOutcome::Aborted {
                    name,
                    stage: ChainStage::Transitioning,
                    error: e.into(),
                };
            }
        };
        debug!(user = %name, from = %user.state, to = %queued.state, "Transitioned user");

        if let Err(error) = self.write(&queued).await {
            error!(
                user = %name,
                stage = %ChainStage::WritingQueued,
                error = %error,
                "Chain aborted"
            );
            return ChainOutcome::Aborted {
                name,
                stage: ChainStage::WritingQueued,
                error,
            };
        }
        info!(user = %name, state = %queued.state, "Stored user");

        let event = UserEvent::queued(queued.clone());
        match self.bus.publish(&self.topic, &event).await {
            Ok(()) => {
                info!(
                    user = %name,
                    event_id = %event.id,
                    topic = %self.topic,
                    "Published user event"
                );
                ChainOutcome::Completed { user: queued }
            }
            Err(e) => {
                warn!(
                    user = %name,
                    event_id = %event.id,
                    topic = %self.topic,
                    error = %e,
                    "Failed to publish user event"
                );
                ChainOutcome::PublishFailed {
                    user: queued,
                    error: e,
                }
            }
        }
    }

    /// Write `user` under its name, replacing any previous record.
    async fn write(&self, user: &User) -> Result<(), ChainError> {
        let record = serde_json::to_string(user)?;
        self.store.put(&user.name, &record).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use reactica_bus::MemoryBus;
    use reactica_store::MemoryStore;

    use super::*;

    fn stored(json: Option<&String>) -> Option<User> {
        json.and_then(|s| serde_json::from_str(s).ok())
    }

    #[tokio::test]
    async fn completed_chain_stores_queued_and_publishes() {
        let store = MemoryStore::new();
        let bus = MemoryBus::new();
        let orchestrator = Orchestrator::new(store.clone(), bus.clone(), "user-events");

        let outcome = orchestrator.run_chain(User::new("alice")).await;
        assert!(outcome.is_completed());
        assert_eq!(outcome.name(), "alice");
        assert_eq!(outcome.stored_state(), Some(UserState::Queued));

        let records = store.snapshot().await;
        let user = stored(records.get("alice"));
        assert_eq!(user.map(|u| u.state), Some(UserState::Queued));

        let published = bus.published().await;
        assert_eq!(published.len(), 1);
        let Some((topic, event)) = published.first() else {
            panic!("nothing published");
        };
        assert_eq!(topic, "user-events");
        assert_eq!(event.identity(), "alice");
        assert_eq!(event.payload.state, UserState::Queued);
    }

    #[tokio::test]
    async fn already_queued_user_is_aborted_at_transition() {
        let store = MemoryStore::new();
        let bus = MemoryBus::new();
        let orchestrator = Orchestrator::new(store.clone(), bus.clone(), "user-events");

        let user = User {
            name: String::from("bob"),
            state: UserState::Queued,
        };
        let outcome = orchestrator.run_chain(user).await;
        assert!(matches!(
            outcome,
            ChainOutcome::Aborted {
                stage: ChainStage::Transitioning,
                error: ChainError::Transition(_),
                ..
            }
        ));
        assert!(bus.published().await.is_empty());
    }

    #[test]
    fn stored_state_follows_failed_stage() {
        let aborted = |stage| ChainOutcome::Aborted {
            name: String::from("x"),
            stage,
            error: ChainError::Store(StoreError::Unavailable(String::from("down"))),
        };
        assert_eq!(aborted(ChainStage::WritingNew).stored_state(), None);
        assert_eq!(aborted(ChainStage::WritingQueued).stored_state(), Some(UserState::New));
    }

    #[test]
    fn stage_labels() {
        assert_eq!(ChainStage::WritingNew.to_string(), "write-new");
        assert_eq!(ChainStage::Publishing.to_string(), "publish");
    }
}
