//! Persistence backends for the settings blob.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use alextras_core::error::{AppError, ErrorKind};
use alextras_core::result::AppResult;

/// Where a [`Store`](crate::Store) loads its blob from and saves it to.
#[async_trait]
pub trait StoreBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Load the persisted blob, or `None` if nothing was saved yet.
    async fn load(&self) -> AppResult<Option<Map<String, Value>>>;

    /// Replace the persisted blob.
    async fn save(&self, data: &Map<String, Value>) -> AppResult<()>;
}

/// Blob stored as a single JSON file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Create a backend writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the blob file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl StoreBackend for FileBackend {
    async fn load(&self) -> AppResult<Option<Map<String, Value>>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read store: {}", self.path.display()),
                    e,
                ));
            }
        };

        let data: Map<String, Value> = serde_json::from_str(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Store file is not a JSON object: {}", self.path.display()),
                e,
            )
        })?;
        Ok(Some(data))
    }

    async fn save(&self, data: &Map<String, Value>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create store directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let bytes = serde_json::to_vec(data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write store: {}", tmp.display()),
                e,
            )
        })?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Persisted store");
        Ok(())
    }
}

/// Blob kept in memory; used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    saved: Mutex<Option<Map<String, Value>>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds `data`.
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self {
            saved: Mutex::new(Some(data)),
        }
    }

    /// The last saved blob.
    pub async fn saved(&self) -> Option<Map<String, Value>> {
        self.saved.lock().await.clone()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn load(&self) -> AppResult<Option<Map<String, Value>>> {
        Ok(self.saved.lock().await.clone())
    }

    async fn save(&self, data: &Map<String, Value>) -> AppResult<()> {
        *self.saved.lock().await = Some(data.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_file_backend_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("missing.json"));
        assert!(backend.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_backend_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested/anilist-extras.json"));
        let mut data = Map::new();
        data.insert("verboseLogging".into(), json!(true));
        backend.save(&data).await.unwrap();
        assert_eq!(backend.load().await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn test_file_backend_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let err = FileBackend::new(path).load().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
    }
}
