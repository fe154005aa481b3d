//! The simulated user and its lifecycle.
//!
//! A [`User`] is created in [`UserState::New`] and moves exactly once to
//! [`UserState::Queued`] before it is announced on the bus. The transition
//! is a pure function: it never mutates the input and carries no hidden
//! state, so applying it to the same `NEW` user always yields the same
//! result.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserState {
    /// Freshly generated, not yet waiting in the queue.
    New,
    /// Waiting in the queue. Terminal for this pipeline.
    Queued,
}

impl core::fmt::Display for UserState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::New => f.write_str("NEW"),
            Self::Queued => f.write_str("QUEUED"),
        }
    }
}

/// Errors raised by lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The user has already been queued; queuing happens exactly once.
    #[error("user {name} is already queued")]
    AlreadyQueued {
        /// Name of the offending user.
        name: String,
    },
}

/// One simulated actor.
///
/// The `name` is the identity of the user and the key of its record in the
/// users cache. It is assigned once at creation and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Unique display name, also used as the store key.
    pub name: String,
    /// Current lifecycle state.
    pub state: UserState,
}

impl User {
    /// Create a new user in [`UserState::New`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: UserState::New,
        }
    }

    /// Return a copy of this user moved to [`UserState::Queued`].
    ///
    /// The name is preserved and `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::AlreadyQueued`] if the user is already
    /// queued. The generator never does this; the error exists so the
    /// orchestrator can report the broken invariant instead of panicking.
    pub fn transition_to_queued(&self) -> Result<Self, TransitionError> {
        match self.state {
            UserState::New => Ok(Self {
                name: self.name.clone(),
                state: UserState::Queued,
            }),
            UserState::Queued => Err(TransitionError::AlreadyQueued {
                name: self.name.clone(),
            }),
        }
    }

    /// Whether the user is waiting in the queue.
    pub const fn is_queued(&self) -> bool {
        matches!(self.state, UserState::Queued)
    }
}
