//! Per-module settings backed by the `settings` map of the store.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use alextras_core::error::AppError;
use alextras_core::result::AppResult;
use alextras_core::types::SettingsSchema;

use crate::keys;
use crate::store::{Store, StoreWatcher};

/// Settings of a single module.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    module_id: String,
    schema: SettingsSchema,
    store: Arc<Store>,
}

impl SettingsManager {
    /// Create a manager for `module_id` whose settings follow `schema`.
    pub fn new(module_id: &str, schema: SettingsSchema, store: Arc<Store>) -> Self {
        Self {
            module_id: module_id.to_string(),
            schema,
            store,
        }
    }

    /// Id of the module.
    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// Schema of the module's settings.
    pub fn schema(&self) -> &SettingsSchema {
        &self.schema
    }

    fn stored(&self, key: &str) -> Option<Value> {
        self.store
            .get(keys::SETTINGS)
            .and_then(|settings| settings.get(&self.module_id)?.get(key).cloned())
            .filter(|v| !v.is_null())
    }

    /// Resolve a setting: stored value, then schema default, then `fallback`.
    pub fn get(&self, key: &str, fallback: Option<Value>) -> Option<Value> {
        self.stored(key)
            .or_else(|| self.schema.get(key).and_then(|d| d.default_value()))
            .or(fallback)
    }

    /// Resolve a setting as `T`; values of the wrong shape read as `None`.
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key, None)
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Every stored setting of the module.
    pub fn all(&self) -> serde_json::Map<String, Value> {
        self.store
            .get(keys::SETTINGS)
            .and_then(|settings| settings.get(&self.module_id)?.as_object().cloned())
            .unwrap_or_default()
    }

    /// Store a setting. Declared settings are checked against their descriptor.
    pub async fn set(&self, key: &str, value: Value) -> AppResult<()> {
        if let Some(descriptor) = self.schema.get(key) {
            descriptor.check_value(&value).map_err(|reason| {
                AppError::validation(format!(
                    "Invalid value for setting '{key}' of module '{}': {reason}",
                    self.module_id
                ))
            })?;
        }

        let module_id = self.module_id.clone();
        self.store
            .update_object(keys::SETTINGS, |settings| {
                let entry = settings
                    .entry(module_id)
                    .or_insert_with(|| Value::Object(Default::default()));
                if !entry.is_object() {
                    *entry = Value::Object(Default::default());
                }
                if let Value::Object(module_settings) = entry {
                    module_settings.insert(key.to_string(), value);
                }
            })
            .await
    }

    /// Remove a stored setting.
    pub async fn remove(&self, key: &str) -> AppResult<()> {
        let module_id = self.module_id.as_str();
        self.store
            .update_object(keys::SETTINGS, |settings| {
                if let Some(Value::Object(module_settings)) = settings.get_mut(module_id) {
                    module_settings.remove(key);
                }
            })
            .await
    }

    /// Remove every stored setting of the module.
    pub async fn clear(&self) -> AppResult<()> {
        let module_id = self.module_id.as_str();
        self.store
            .update_object(keys::SETTINGS, |settings| {
                settings.remove(module_id);
            })
            .await
    }

    /// Watch a single setting of the module.
    pub fn watch(&self, key: &str) -> SettingWatcher {
        SettingWatcher {
            module_id: self.module_id.clone(),
            key: key.to_string(),
            inner: self.store.watch(keys::SETTINGS),
        }
    }
}

/// Yields `(new, previous)` values of one module setting.
#[derive(Debug)]
pub struct SettingWatcher {
    module_id: String,
    key: String,
    inner: StoreWatcher,
}

impl SettingWatcher {
    fn pick(&self, settings: &Value) -> Value {
        settings
            .get(&self.module_id)
            .and_then(|m| m.get(&self.key))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Wait for the next change of the setting. A wholesale store reset yields
    /// `(Null, Null)`. Returns `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<(Value, Value)> {
        loop {
            let (new, previous) = self.inner.changed().await?;
            if new.is_null() && previous.is_null() {
                return Some((Value::Null, Value::Null));
            }
            let new = self.pick(&new);
            let previous = self.pick(&previous);
            if new != previous {
                return Some((new, previous));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alextras_core::error::ErrorKind;
    use alextras_core::types::SettingDescriptor;
    use serde_json::json;

    async fn make_manager() -> SettingsManager {
        let schema = SettingsSchema::new()
            .with("showIcon", SettingDescriptor::toggle("Show icon", true))
            .with(
                "precision",
                SettingDescriptor::number("Precision", Some(0.0), Some(3.0), Some(1.0)),
            );
        SettingsManager::new(
            "addMalScore",
            schema,
            Arc::new(Store::in_memory().await.unwrap()),
        )
    }

    #[tokio::test]
    async fn test_round_trip() {
        let settings = make_manager().await;
        settings.set("showIcon", json!(false)).await.unwrap();
        assert_eq!(settings.get("showIcon", None), Some(json!(false)));
    }

    #[tokio::test]
    async fn test_remove_falls_back_to_default_then_fallback() {
        let settings = make_manager().await;
        settings.set("showIcon", json!(false)).await.unwrap();
        settings.remove("showIcon").await.unwrap();
        assert_eq!(settings.get("showIcon", Some(json!("x"))), Some(json!(true)));

        settings.set("undeclared", json!(5)).await.unwrap();
        settings.remove("undeclared").await.unwrap();
        assert_eq!(settings.get("undeclared", Some(json!("x"))), Some(json!("x")));
        assert_eq!(settings.get("undeclared", None), None);
    }

    #[tokio::test]
    async fn test_declared_setting_is_validated() {
        let settings = make_manager().await;
        let err = settings.set("precision", json!(9)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = settings.set("showIcon", json!("yes")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_clear_only_touches_own_module() {
        let store = Arc::new(Store::in_memory().await.unwrap());
        let a = SettingsManager::new("a", SettingsSchema::new(), store.clone());
        let b = SettingsManager::new("b", SettingsSchema::new(), store.clone());
        a.set("k", json!(1)).await.unwrap();
        b.set("k", json!(2)).await.unwrap();

        a.clear().await.unwrap();
        assert_eq!(a.get("k", None), None);
        assert_eq!(b.get("k", None), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_watch_filters_other_keys_and_modules() {
        let store = Arc::new(Store::in_memory().await.unwrap());
        let a = SettingsManager::new("a", SettingsSchema::new(), store.clone());
        let b = SettingsManager::new("b", SettingsSchema::new(), store.clone());
        let mut watcher = a.watch("k");

        b.set("k", json!("other module")).await.unwrap();
        a.set("other", json!("other key")).await.unwrap();
        a.set("k", json!(1)).await.unwrap();
        assert_eq!(watcher.changed().await, Some((json!(1), Value::Null)));

        store.clear().await.unwrap();
        assert_eq!(watcher.changed().await, Some((Value::Null, Value::Null)));
    }
}
