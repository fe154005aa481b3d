//! Lifecycle announcements published on the bus.
//!
//! A [`UserEvent`] is built by the orchestrator once a user's `QUEUED`
//! record has been written, and is consumed by the event store. Events are
//! immutable fire-and-forget messages: the producer never keeps them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::User;

/// The kind of lifecycle transition an event announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// A user entered the queue.
    UserQueued,
}

/// An announcement of a user lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEvent {
    /// Time-ordered event identifier (UUID v7), for log correlation.
    pub id: Uuid,
    /// What happened.
    pub kind: EventKind,
    /// The user as it was right after the transition.
    pub payload: User,
    /// When the event was built.
    pub occurred_at: DateTime<Utc>,
}

impl UserEvent {
    /// Build a [`EventKind::UserQueued`] event for `user`.
    pub fn queued(user: User) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind: EventKind::UserQueued,
            payload: user,
            occurred_at: Utc::now(),
        }
    }

    /// The identity the event is recorded under: the user's name.
    pub fn identity(&self) -> &str {
        &self.payload.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserState;

    #[test]
    fn queued_event_carries_user() {
        let user = User::new("alice")
            .transition_to_queued()
            .unwrap_or_else(|_| User::new("unreachable"));
        let event = UserEvent::queued(user);
        assert_eq!(event.kind, EventKind::UserQueued);
        assert_eq!(event.identity(), "alice");
        assert_eq!(event.payload.state, UserState::Queued);
    }

    #[test]
    fn wire_format_has_kind_and_payload() {
        let event = UserEvent::queued(User {
            name: String::from("bob"),
            state: UserState::Queued,
        });
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["kind"], "USER_QUEUED");
        assert_eq!(json["payload"]["name"], "bob");
        assert_eq!(json["payload"]["state"], "QUEUED");
        assert!(json["id"].is_string());
        assert!(json["occurred_at"].is_string());
    }

    #[test]
    fn event_ids_are_unique() {
        let a = UserEvent::queued(User::new("x"));
        let b = UserEvent::queued(User::new("x"));
        assert_ne!(a.id, b.id);
    }
}
