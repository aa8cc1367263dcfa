//! Disk-backed expiring cache.
//!
//! Each store lives in `<directory>/<store>.json` as a map of key to
//! `{ value, expires_at }`. Expired entries are purged the first time a
//! store is opened and lazily on read afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use alextras_core::error::{AppError, ErrorKind};
use alextras_core::result::AppResult;
use alextras_core::traits::cache::ExpiringCache;

/// A persisted cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DiskEntry {
    value: Value,
    expires_at: DateTime<Utc>,
}

impl DiskEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The in-memory image of one store file.
#[derive(Debug, Default)]
struct StoreFile {
    entries: HashMap<String, DiskEntry>,
}

/// Disk cache provider.
#[derive(Debug)]
pub struct DiskCacheProvider {
    /// Directory holding the store files.
    root: PathBuf,
    /// Opened stores, each guarded by its own lock.
    stores: DashMap<String, Arc<Mutex<StoreFile>>>,
}

impl DiskCacheProvider {
    /// Open (and create if needed) a cache directory.
    pub async fn open(directory: &str) -> AppResult<Self> {
        let root = PathBuf::from(directory);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Cache,
                format!("Failed to create cache directory: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            stores: DashMap::new(),
        })
    }

    /// File path of a store. Names outside `[A-Za-z0-9_-]` are rejected so
    /// distinct stores never share a file.
    fn store_path(&self, store: &str) -> AppResult<PathBuf> {
        let safe = !store.is_empty()
            && store
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(AppError::validation(format!(
                "Invalid cache store name '{store}'"
            )));
        }
        Ok(self.root.join(format!("{store}.json")))
    }

    /// Get an opened store, loading it from disk on first use.
    async fn open_store(&self, store: &str) -> AppResult<Arc<Mutex<StoreFile>>> {
        if let Some(existing) = self.stores.get(store) {
            return Ok(existing.clone());
        }

        let path = self.store_path(store)?;
        let mut file = load_store(&path).await?;

        let now = Utc::now();
        let before = file.entries.len();
        file.entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before - file.entries.len();
        if purged > 0 {
            debug!(store, purged, "Purged expired cache entries");
            persist_store(&path, &file).await?;
        }

        let opened = self
            .stores
            .entry(store.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(file)))
            .clone();
        Ok(opened)
    }
}

async fn load_store(path: &Path) -> AppResult<StoreFile> {
    match fs::read_to_string(path).await {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(entries) => Ok(StoreFile { entries }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding unreadable cache store");
                Ok(StoreFile::default())
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::default()),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Cache,
            format!("Failed to read cache store: {}", path.display()),
            e,
        )),
    }
}

async fn persist_store(path: &Path, file: &StoreFile) -> AppResult<()> {
    let data = serde_json::to_vec(&file.entries)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &data).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Cache,
            format!("Failed to write cache store: {}", path.display()),
            e,
        )
    })?;
    fs::rename(&tmp, path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Cache,
            format!("Failed to replace cache store: {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn expiry_from(ttl: Duration) -> DateTime<Utc> {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
    Utc::now()
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[async_trait]
impl ExpiringCache for DiskCacheProvider {
    async fn get(&self, store: &str, key: &str) -> AppResult<Option<Value>> {
        let handle = self.open_store(store).await?;
        let mut file = handle.lock().await;

        let Some(entry) = file.entries.get(key) else {
            return Ok(None);
        };

        if entry.is_expired(Utc::now()) {
            file.entries.remove(key);
            persist_store(&self.store_path(store)?, &file).await?;
            return Ok(None);
        }

        debug!(store, key, expires_at = %entry.expires_at, "Cache hit");
        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, store: &str, key: &str, value: Value, ttl: Duration) -> AppResult<()> {
        let handle = self.open_store(store).await?;
        let mut file = handle.lock().await;
        file.entries.insert(
            key.to_string(),
            DiskEntry {
                value,
                expires_at: expiry_from(ttl),
            },
        );
        persist_store(&self.store_path(store)?, &file).await
    }

    async fn delete(&self, store: &str, key: &str) -> AppResult<()> {
        let handle = self.open_store(store).await?;
        let mut file = handle.lock().await;
        if file.entries.remove(key).is_some() {
            persist_store(&self.store_path(store)?, &file).await?;
        }
        Ok(())
    }

    async fn clear(&self, store: &str) -> AppResult<()> {
        let handle = self.open_store(store).await?;
        let mut file = handle.lock().await;
        let count = file.entries.len();
        file.entries.clear();
        persist_store(&self.store_path(store)?, &file).await?;
        debug!(store, count, "Cleared cache store");
        Ok(())
    }

    async fn drop_all(&self) -> AppResult<()> {
        self.stores.clear();

        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path).await?;
            }
        }
        debug!(root = %self.root.display(), "Dropped all cache stores");
        Ok(())
    }
}
