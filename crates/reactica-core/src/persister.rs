//! Consumer-side event persistence.

use reactica_bus::{EventHandler, HandlerError};
use reactica_store::KeyValueStore;
use reactica_types::UserEvent;
use tracing::info;

/// Records every received event in the user-events cache, keyed by the
/// user's name.
///
/// A later event for the same user overwrites the earlier one, so the
/// cache holds the last event seen per user. Events for distinct users are
/// independent and may be written concurrently.
#[derive(Debug)]
pub struct EventPersister<S> {
    store: S,
}

impl<S: KeyValueStore> EventPersister<S> {
    /// Create a persister writing to `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> EventHandler for EventPersister<S> {
    async fn handle(&self, event: UserEvent) -> Result<(), HandlerError> {
        // Failures are logged once, by the dispatch loop that receives them.
        let record = serde_json::to_string(&event).map_err(HandlerError::new)?;
        self.store
            .put(event.identity(), &record)
            .await
            .map_err(HandlerError::new)?;
        info!(
            user = %event.identity(),
            event_id = %event.id,
            kind = ?event.kind,
            "Saved user event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use reactica_store::{MemoryStore, StoreError};
    use reactica_types::{User, UserState};

    use super::*;

    /// A user-events cache that refuses every write.
    struct ReadOnly;

    impl KeyValueStore for ReadOnly {
        async fn put(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable(String::from("read-only replica")))
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        async fn clear(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn queued(name: &str) -> UserEvent {
        UserEvent::queued(User {
            name: name.to_owned(),
            state: UserState::Queued,
        })
    }

    #[tokio::test]
    async fn event_is_stored_under_user_name() {
        let store = MemoryStore::new();
        let persister = EventPersister::new(store.clone());
        let event = queued("alice");

        assert!(persister.handle(event.clone()).await.is_ok());

        let stored = store.get("alice").await.ok().flatten();
        let decoded: Option<UserEvent> = stored.and_then(|s| serde_json::from_str(&s).ok());
        assert_eq!(decoded, Some(event));
    }

    #[tokio::test]
    async fn later_event_overwrites_earlier() {
        let store = MemoryStore::new();
        let persister = EventPersister::new(store.clone());
        let first = queued("bob");
        let second = queued("bob");

        assert!(persister.handle(first).await.is_ok());
        assert!(persister.handle(second.clone()).await.is_ok());

        assert_eq!(store.len().await, 1);
        let stored = store.get("bob").await.ok().flatten().unwrap_or_default();
        assert!(stored.contains(&second.id.to_string()));
    }

    #[tokio::test]
    async fn store_failure_is_returned_to_the_dispatcher() {
        let persister = EventPersister::new(ReadOnly);
        let result = persister.handle(queued("carol")).await;
        let message = result.err().map(|e| e.message).unwrap_or_default();
        assert!(message.contains("read-only replica"), "{message}");
    }
}
