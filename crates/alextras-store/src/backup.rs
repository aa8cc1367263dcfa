//! Backup, restore and housekeeping of the settings blob.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use alextras_core::error::AppError;
use alextras_core::result::AppResult;

use crate::keys;
use crate::store::Store;

/// Metadata attached to every exported backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    /// Version of the application that wrote the backup.
    pub version: String,
    /// When the backup was written.
    pub created_at: DateTime<Utc>,
}

/// Remove settings and module states of modules that are not registered.
///
/// Must only run once every module has been registered.
pub async fn purge_unused_settings<'a, I>(store: &Store, registered: I) -> AppResult<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let registered: HashSet<&str> = registered.into_iter().collect();
    let mut purged = 0;

    for key in [keys::SETTINGS, keys::MODULE_STATES] {
        let Some(Value::Object(map)) = store.get(key) else {
            continue;
        };
        let stale: Vec<String> = map
            .keys()
            .filter(|id| !registered.contains(id.as_str()))
            .cloned()
            .collect();
        if stale.is_empty() {
            continue;
        }

        purged += stale.len();
        debug!(key, modules = ?stale, "Purging settings of unregistered modules");
        store
            .update_object(key, |map| {
                for id in &stale {
                    map.remove(id);
                }
            })
            .await?;
    }

    Ok(purged)
}

/// Export the blob for backup. The API token is never included.
pub async fn export<'a, I>(store: &Store, registered: I, version: &str) -> AppResult<Value>
where
    I: IntoIterator<Item = &'a str>,
{
    purge_unused_settings(store, registered).await?;

    let mut data = store.get_all();
    data.remove(keys::API_TOKEN);
    let meta = BackupMeta {
        version: version.to_string(),
        created_at: Utc::now(),
    };
    data.insert(keys::BACKUP_META.to_string(), serde_json::to_value(&meta)?);

    info!(keys = data.len(), "Exported settings backup");
    Ok(Value::Object(data))
}

/// Restore a backup written by [`export`], replacing the blob wholesale.
///
/// The current API token is preserved.
pub async fn import(store: &Store, backup: Value) -> AppResult<BackupMeta> {
    let Value::Object(mut data) = backup else {
        return Err(AppError::validation("Backup must be a JSON object"));
    };

    let meta = data
        .remove(keys::BACKUP_META)
        .ok_or_else(|| AppError::validation("Backup is missing its metadata"))?;
    let meta: BackupMeta = serde_json::from_value(meta)
        .map_err(|e| AppError::validation(format!("Backup metadata is invalid: {e}")))?;

    if let Some(token) = store.get(keys::API_TOKEN) {
        data.insert(keys::API_TOKEN.to_string(), token);
    }

    store.replace_all(data).await?;
    info!(version = %meta.version, created_at = %meta.created_at, "Restored settings backup");
    Ok(meta)
}

/// Parse raw backup text.
pub fn parse_backup(raw: &str) -> AppResult<Value> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::validation(format!("Backup is not valid JSON: {e}")))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alextras_core::error::ErrorKind;
    use serde_json::json;

    async fn seeded_store() -> Store {
        let store = Store::in_memory().await.unwrap();
        store
            .set("settings", json!({"addMalLink": {"a": 1}, "removedModule": {"b": 2}}))
            .await
            .unwrap();
        store
            .set("moduleStates", json!({"addMalLink": true, "removedModule": false}))
            .await
            .unwrap();
        store.set("apiToken", json!("secret")).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_purge_unused_settings() {
        let store = seeded_store().await;
        let purged = purge_unused_settings(&store, ["addMalLink"]).await.unwrap();
        assert_eq!(purged, 2);
        assert_eq!(store.get("settings"), Some(json!({"addMalLink": {"a": 1}})));
        assert_eq!(store.get("moduleStates"), Some(json!({"addMalLink": true})));
    }

    #[tokio::test]
    async fn test_export_strips_token_and_adds_meta() {
        let store = seeded_store().await;
        let backup = export(&store, ["addMalLink"], "0.4.4").await.unwrap();

        assert!(backup.get("apiToken").is_none());
        assert_eq!(backup["alextrasMeta"]["version"], json!("0.4.4"));
        assert!(backup["alextrasMeta"]["createdAt"].is_string());
        assert!(backup["settings"].get("removedModule").is_none());
        assert_eq!(store.get("apiToken"), Some(json!("secret")));
    }

    #[tokio::test]
    async fn test_import_requires_meta() {
        let store = seeded_store().await;
        let err = import(&store, json!({"settings": {}})).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(store.get("settings").is_some());
    }

    #[tokio::test]
    async fn test_import_replaces_and_keeps_token() {
        let store = seeded_store().await;
        let backup = json!({
            "settings": {"addMalScore": {"precision": 2}},
            "moduleStates": {"addMalScore": false},
            "apiToken": "from-backup",
            "alextrasMeta": {"version": "0.4.0", "createdAt": "2024-01-01T00:00:00Z"}
        });

        let meta = import(&store, backup).await.unwrap();
        assert_eq!(meta.version, "0.4.0");
        assert_eq!(store.get("settings"), Some(json!({"addMalScore": {"precision": 2}})));
        assert_eq!(store.get("moduleStates"), Some(json!({"addMalScore": false})));
        assert_eq!(store.get("apiToken"), Some(json!("secret")));
        assert!(store.get("alextrasMeta").is_none());
    }

    #[test]
    fn test_parse_backup_rejects_garbage() {
        assert_eq!(
            parse_backup("not json").unwrap_err().kind,
            ErrorKind::Validation
        );
    }
}
