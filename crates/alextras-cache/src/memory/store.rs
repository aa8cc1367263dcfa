//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use serde_json::Value;
use tracing::debug;

use alextras_core::result::AppResult;
use alextras_core::traits::cache::ExpiringCache;

/// Composite key of a cached entry.
type EntryKey = (String, String);

/// A cached value together with the lifetime it was written with.
#[derive(Debug, Clone)]
struct CachedValue {
    value: Value,
    ttl: Duration,
}

/// Per-entry expiry: every write restarts the entry's own lifetime.
struct EntryExpiry;

impl Expiry<EntryKey, CachedValue> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &EntryKey,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &EntryKey,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<EntryKey, CachedValue>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl ExpiringCache for MemoryCacheProvider {
    async fn get(&self, store: &str, key: &str) -> AppResult<Option<Value>> {
        let entry_key = (store.to_string(), key.to_string());
        let cached = self.cache.get(&entry_key).await;
        if cached.is_some() {
            debug!(store, key, "Cache hit");
        }
        Ok(cached.map(|c| c.value))
    }

    async fn set(&self, store: &str, key: &str, value: Value, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert((store.to_string(), key.to_string()), CachedValue { value, ttl })
            .await;
        Ok(())
    }

    async fn delete(&self, store: &str, key: &str) -> AppResult<()> {
        self.cache
            .invalidate(&(store.to_string(), key.to_string()))
            .await;
        Ok(())
    }

    async fn clear(&self, store: &str) -> AppResult<()> {
        // Moka doesn't support scanning by prefix, so we iterate.
        let keys_to_remove: Vec<EntryKey> = self
            .cache
            .iter()
            .filter(|(key, _)| key.0 == store)
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        let count = keys_to_remove.len();
        for key in keys_to_remove {
            self.cache.invalidate(&key).await;
        }

        debug!(store, count, "Cleared cache store");
        Ok(())
    }

    async fn drop_all(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        Ok(())
    }
}
