//! In-process store backend.
//!
//! [`MemoryStore`] keeps one cache in a [`BTreeMap`] behind a
//! [`tokio::sync::RwLock`]. Clones share the same map, which lets a test
//! hand one clone to the pipeline and inspect another.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::KeyValueStore;
use crate::error::StoreError;

/// A shared in-memory cache.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry, ordered by key.
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.read().await.clone()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_previous_value() {
        let store = MemoryStore::new();
        assert!(store.put("alice", "v1").await.is_ok());
        assert!(store.put("alice", "v2").await.is_ok());
        assert_eq!(store.get("alice").await.ok().flatten().as_deref(), Some("v2"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn missing_key_reads_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nobody").await.ok(), Some(None));
    }

    #[tokio::test]
    async fn clear_empties_the_cache() {
        let store = MemoryStore::new();
        let _ = store.put("a", "1").await;
        let _ = store.put("b", "2").await;
        assert!(store.clear().await.is_ok());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        let _ = other.put("k", "v").await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.get("k").map(String::as_str), Some("v"));
    }
}
