//! Expiring cache trait for pluggable caching backends.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::result::AppResult;

/// TTL-based cache keyed by `(store, key)`.
///
/// Values are arbitrary JSON. Expired entries behave exactly like missing
/// ones. Implementations must tolerate concurrent use from many tasks;
/// concurrent writes to the same key are last-write-wins.
#[async_trait]
pub trait ExpiringCache: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value. Returns `None` if the key does not exist or has expired.
    async fn get(&self, store: &str, key: &str) -> AppResult<Option<Value>>;

    /// Set a value that expires after `ttl`.
    async fn set(&self, store: &str, key: &str, value: Value, ttl: Duration) -> AppResult<()>;

    /// Delete a single key.
    async fn delete(&self, store: &str, key: &str) -> AppResult<()>;

    /// Delete every key of a store.
    async fn clear(&self, store: &str) -> AppResult<()>;

    /// Drop every store.
    async fn drop_all(&self) -> AppResult<()>;
}

/// Typed helpers available on every [`ExpiringCache`], including trait objects.
#[async_trait]
pub trait ExpiringCacheExt: ExpiringCache {
    /// Get a typed value by deserializing the stored JSON.
    async fn get_typed<T: DeserializeOwned + Send>(
        &self,
        store: &str,
        key: &str,
    ) -> AppResult<Option<T>> {
        match self.get(store, key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing it to JSON.
    async fn set_typed<T: Serialize + Send + Sync>(
        &self,
        store: &str,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let value = serde_json::to_value(value)?;
        self.set(store, key, value, ttl).await
    }
}

impl<C: ExpiringCache + ?Sized> ExpiringCacheExt for C {}
