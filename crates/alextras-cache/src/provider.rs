//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use alextras_core::config::cache::CacheConfig;
use alextras_core::error::AppError;
use alextras_core::result::AppResult;
use alextras_core::traits::cache::ExpiringCache;

/// Cache manager that wraps the configured cache provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn ExpiringCache>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn ExpiringCache> = match config.provider.as_str() {
            #[cfg(feature = "disk")]
            "disk" => {
                info!(directory = %config.directory, "Initializing disk cache provider");
                let provider = crate::disk::DiskCacheProvider::open(&config.directory).await?;
                Arc::new(provider)
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory cache provider");
                Arc::new(crate::memory::MemoryCacheProvider::new(config.max_capacity))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, disk"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn ExpiringCache>) -> Self {
        Self { inner: provider }
    }

    /// Get a reference to the inner provider.
    pub fn provider(&self) -> &dyn ExpiringCache {
        self.inner.as_ref()
    }
}

#[async_trait]
impl ExpiringCache for CacheManager {
    async fn get(&self, store: &str, key: &str) -> AppResult<Option<Value>> {
        self.inner.get(store, key).await
    }

    async fn set(&self, store: &str, key: &str, value: Value, ttl: Duration) -> AppResult<()> {
        self.inner.set(store, key, value, ttl).await
    }

    async fn delete(&self, store: &str, key: &str) -> AppResult<()> {
        self.inner.delete(store, key).await
    }

    async fn clear(&self, store: &str) -> AppResult<()> {
        self.inner.clear(store).await
    }

    async fn drop_all(&self) -> AppResult<()> {
        self.inner.drop_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let config = CacheConfig {
            provider: "redis".to_string(),
            ..CacheConfig::default()
        };
        let err = CacheManager::new(&config).await.unwrap_err();
        assert_eq!(err.kind, alextras_core::error::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_memory_provider_selected_by_default() {
        let manager = CacheManager::new(&CacheConfig::default()).await.unwrap();
        manager
            .set("store", "key", serde_json::json!(1), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            manager.get("store", "key").await.unwrap(),
            Some(serde_json::json!(1))
        );
    }
}
