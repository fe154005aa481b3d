//! `Dragonfly` (Redis-compatible) store backend.
//!
//! One [`DragonflyPool`] holds the shared connection. Each named cache is a
//! single Redis hash, so several caches can live on the same instance and
//! clearing one never touches another.
//!
//! # Key Patterns
//!
//! | Cache | Type | Field | Value |
//! |-------|------|-------|-------|
//! | `users` | Hash | user name | JSON user record |
//! | `userevents` | Hash | user name | JSON user event |

use fred::prelude::*;
use tracing::{debug, info};

use crate::KeyValueStore;
use crate::error::StoreError;
use crate::policy::CallPolicy;

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`]. Cloning is cheap and shares the
/// underlying connection.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
}

impl DragonflyPool {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL cannot be parsed.
    /// Returns [`StoreError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let config = Config::from_url(url)
            .map_err(|e| StoreError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        info!(url, "Connected to Dragonfly");
        Ok(Self { client })
    }

    /// Build the URL for a host/port pair.
    pub fn url_for(host: &str, port: u16) -> String {
        format!("redis://{host}:{port}")
    }

    /// Open the named cache with the given call policy.
    pub fn cache(&self, name: &str, policy: CallPolicy) -> DragonflyCache {
        DragonflyCache {
            client: self.client.clone(),
            name: name.to_owned(),
            policy,
        }
    }
}

impl std::fmt::Debug for DragonflyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragonflyPool").finish_non_exhaustive()
    }
}

/// A named cache stored as one Redis hash.
#[derive(Clone)]
pub struct DragonflyCache {
    client: Client,
    name: String,
    policy: CallPolicy,
}

impl std::fmt::Debug for DragonflyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragonflyCache")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl KeyValueStore for DragonflyCache {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let client = &self.client;
        let cache = self.name.as_str();
        self.policy
            .run("put", || async move {
                let _: i64 = client.hset(cache, (key, value)).await?;
                Ok::<(), StoreError>(())
            })
            .await?;
        debug!(cache, key, "stored value");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let client = &self.client;
        let cache = self.name.as_str();
        self.policy
            .run("get", || async move {
                let value: Option<String> = client.hget(cache, key).await?;
                Ok::<_, StoreError>(value)
            })
            .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let client = &self.client;
        let cache = self.name.as_str();
        self.policy
            .run("clear", || async move {
                let _: i64 = client.del(cache).await?;
                Ok::<(), StoreError>(())
            })
            .await?;
        info!(cache, "cache cleared");
        Ok(())
    }
}
