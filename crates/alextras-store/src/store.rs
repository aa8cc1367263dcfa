//! The namespaced settings blob.
//!
//! Reads are synchronous and served from memory. Writes update memory
//! first, then persist the whole blob through the backend and notify
//! subscribers. Concurrent writers are last-write-wins per key, and the
//! read-modify-write helpers ([`Store::update_object`]) are atomic.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use alextras_core::config::store::StoreConfig;
use alextras_core::result::AppResult;

use crate::backend::{FileBackend, MemoryBackend, StoreBackend};
use crate::keys;

/// Buffer size of the change channel.
const CHANGE_BUFFER: usize = 256;

/// A change to the blob.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    /// The key that changed, or `None` when the blob was reset wholesale.
    pub key: Option<String>,
    /// The new value (`Null` when removed).
    pub value: Value,
    /// The value before the change (`Null` when absent).
    pub previous: Value,
}

/// Persistent key-value store.
#[derive(Debug)]
pub struct Store {
    namespace: String,
    data: RwLock<Map<String, Value>>,
    backend: Arc<dyn StoreBackend>,
    changes: broadcast::Sender<StoreChange>,
    /// Serializes persistence so the last save always carries the latest blob.
    persist_lock: Mutex<()>,
}

impl Store {
    /// Open a store, loading the blob from the backend.
    pub async fn open(namespace: &str, backend: Arc<dyn StoreBackend>) -> AppResult<Self> {
        let data = backend.load().await?.unwrap_or_default();
        debug!(namespace, keys = data.len(), "Opened store");
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Ok(Self {
            namespace: namespace.to_string(),
            data: RwLock::new(data),
            backend,
            changes,
            persist_lock: Mutex::new(()),
        })
    }

    /// Open the file-backed store described by configuration.
    pub async fn open_file(config: &StoreConfig) -> AppResult<Self> {
        let path = PathBuf::from(&config.directory).join(format!("{}.json", config.namespace));
        info!(path = %path.display(), "Opening settings store");
        Self::open(&config.namespace, Arc::new(FileBackend::new(path))).await
    }

    /// Open an empty in-memory store.
    pub async fn in_memory() -> AppResult<Self> {
        Self::open("anilist-extras", Arc::new(MemoryBackend::new())).await
    }

    /// Namespace of the blob.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn read(&self) -> RwLockReadGuard<'_, Map<String, Value>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Map<String, Value>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a copy of the value under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Get the value under `key` deserialized as `T`; mismatched types read as `None`.
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v).ok())
    }

    /// A snapshot of the whole blob.
    pub fn get_all(&self) -> Map<String, Value> {
        self.read().clone()
    }

    /// Set `key` to `value`.
    pub async fn set(&self, key: &str, value: Value) -> AppResult<()> {
        let previous = self
            .write()
            .insert(key.to_string(), value.clone())
            .unwrap_or(Value::Null);
        self.commit(Some(key.to_string()), value, previous).await
    }

    /// Remove `key`.
    pub async fn remove(&self, key: &str) -> AppResult<()> {
        let previous = self.write().remove(key);
        match previous {
            Some(previous) => self.commit(Some(key.to_string()), Value::Null, previous).await,
            None => Ok(()),
        }
    }

    /// Atomically modify the object stored under `key` (created if absent).
    pub async fn update_object<F>(&self, key: &str, f: F) -> AppResult<()>
    where
        F: FnOnce(&mut Map<String, Value>) + Send,
    {
        let (value, previous) = {
            let mut data = self.write();
            let previous = data.get(key).cloned().unwrap_or(Value::Null);
            let mut object = match &previous {
                Value::Object(map) => map.clone(),
                _ => Map::new(),
            };
            f(&mut object);
            let value = Value::Object(object);
            data.insert(key.to_string(), value.clone());
            (value, previous)
        };
        self.commit(Some(key.to_string()), value, previous).await
    }

    /// Remove all module settings and module states, keeping other keys.
    pub async fn clear(&self) -> AppResult<()> {
        {
            let mut data = self.write();
            data.remove(keys::SETTINGS);
            data.remove(keys::MODULE_STATES);
        }
        info!(namespace = %self.namespace, "Cleared module settings and states");
        self.commit(None, Value::Null, Value::Null).await
    }

    /// Replace the whole blob.
    pub async fn replace_all(&self, data: Map<String, Value>) -> AppResult<()> {
        *self.write() = data;
        info!(namespace = %self.namespace, "Replaced store contents");
        self.commit(None, Value::Null, Value::Null).await
    }

    /// Subscribe to every change.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// Watch a single key.
    pub fn watch(&self, key: &str) -> StoreWatcher {
        StoreWatcher {
            key: key.to_string(),
            rx: self.changes.subscribe(),
        }
    }

    async fn commit(&self, key: Option<String>, value: Value, previous: Value) -> AppResult<()> {
        let result = self.persist().await;
        let _ = self.changes.send(StoreChange {
            key,
            value,
            previous,
        });
        result
    }

    async fn persist(&self) -> AppResult<()> {
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.get_all();
        self.backend.save(&snapshot).await.inspect_err(|e| {
            warn!(namespace = %self.namespace, error = %e, "Failed to persist store");
        })
    }
}

/// Yields `(new, previous)` pairs for one key.
///
/// A wholesale reset of the blob yields `(Null, Null)`.
#[derive(Debug)]
pub struct StoreWatcher {
    key: String,
    rx: broadcast::Receiver<StoreChange>,
}

impl StoreWatcher {
    /// Wait for the next change of the watched key. Returns `None` once the
    /// store is dropped.
    pub async fn changed(&mut self) -> Option<(Value, Value)> {
        loop {
            match self.rx.recv().await {
                Ok(change) => match change.key {
                    Some(key) if key == self.key => return Some((change.value, change.previous)),
                    Some(_) => continue,
                    None => return Some((Value::Null, Value::Null)),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(key = %self.key, skipped, "Store watcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = Store::in_memory().await.unwrap();
        store.set("verboseLogging", json!(true)).await.unwrap();
        assert_eq!(store.get("verboseLogging"), Some(json!(true)));
        assert_eq!(store.get_typed::<bool>("verboseLogging"), Some(true));

        store.remove("verboseLogging").await.unwrap();
        assert_eq!(store.get("verboseLogging"), None);
    }

    #[tokio::test]
    async fn test_writes_are_persisted() {
        let backend = Arc::new(MemoryBackend::new());
        let store = Store::open("ns", backend.clone()).await.unwrap();
        store.set("a", json!(1)).await.unwrap();

        let saved = backend.saved().await.unwrap();
        assert_eq!(saved.get("a"), Some(&json!(1)));

        let reopened = Store::open("ns", backend).await.unwrap();
        assert_eq!(reopened.get("a"), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            directory: dir.path().to_string_lossy().into_owned(),
            namespace: "anilist-extras".to_string(),
        };
        {
            let store = Store::open_file(&config).await.unwrap();
            store.set("apiToken", json!("secret")).await.unwrap();
        }
        let store = Store::open_file(&config).await.unwrap();
        assert_eq!(store.get("apiToken"), Some(json!("secret")));
        assert!(dir.path().join("anilist-extras.json").exists());
    }

    #[tokio::test]
    async fn test_watch_yields_new_and_previous() {
        let store = Store::in_memory().await.unwrap();
        let mut watcher = store.watch("a");

        store.set("b", json!("ignored")).await.unwrap();
        store.set("a", json!(1)).await.unwrap();
        store.set("a", json!(2)).await.unwrap();

        assert_eq!(watcher.changed().await, Some((json!(1), Value::Null)));
        assert_eq!(watcher.changed().await, Some((json!(2), json!(1))));
    }

    #[tokio::test]
    async fn test_clear_keeps_other_keys_and_notifies_null() {
        let store = Store::in_memory().await.unwrap();
        store.set("settings", json!({"m": {"k": 1}})).await.unwrap();
        store.set("moduleStates", json!({"m": false})).await.unwrap();
        store.set("apiToken", json!("t")).await.unwrap();

        let mut watcher = store.watch("settings");
        store.clear().await.unwrap();

        assert_eq!(store.get("settings"), None);
        assert_eq!(store.get("moduleStates"), None);
        assert_eq!(store.get("apiToken"), Some(json!("t")));
        assert_eq!(watcher.changed().await, Some((Value::Null, Value::Null)));
    }

    #[tokio::test]
    async fn test_update_object_creates_and_merges() {
        let store = Store::in_memory().await.unwrap();
        store
            .update_object("moduleStates", |m| {
                m.insert("a".into(), json!(true));
            })
            .await
            .unwrap();
        store
            .update_object("moduleStates", |m| {
                m.insert("b".into(), json!(false));
            })
            .await
            .unwrap();
        assert_eq!(
            store.get("moduleStates"),
            Some(json!({"a": true, "b": false}))
        );
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(Store::in_memory().await.unwrap());
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update_object("moduleStates", |m| {
                        m.insert(format!("m{i}"), json!(true));
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let states = store.get("moduleStates").unwrap();
        assert_eq!(states.as_object().unwrap().len(), 20);
    }
}
