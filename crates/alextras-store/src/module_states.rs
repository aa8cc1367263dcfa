//! Persisted enabled/disabled flags of modules.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use alextras_core::result::AppResult;

use crate::keys;
use crate::store::Store;

/// Access to the `moduleStates` map of the store.
#[derive(Debug, Clone)]
pub struct ModuleStates {
    store: Arc<Store>,
}

impl ModuleStates {
    /// Create a view over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// The persisted enabled flag of a module, if any.
    pub fn get(&self, module_id: &str) -> Option<bool> {
        self.store
            .get(keys::MODULE_STATES)
            .and_then(|states| states.get(module_id).and_then(Value::as_bool))
    }

    /// Effective enabled state: the persisted flag, else `!disabled_default`.
    pub fn is_enabled(&self, module_id: &str, disabled_default: bool) -> bool {
        self.get(module_id).unwrap_or(!disabled_default)
    }

    /// Persist the enabled flag of a module.
    pub async fn set(&self, module_id: &str, enabled: bool) -> AppResult<()> {
        debug!(module_id, enabled, "Persisting module state");
        self.store
            .update_object(keys::MODULE_STATES, |states| {
                states.insert(module_id.to_string(), Value::Bool(enabled));
            })
            .await
    }

    /// Forget the persisted flag, falling back to the module default.
    pub async fn remove(&self, module_id: &str) -> AppResult<()> {
        self.store
            .update_object(keys::MODULE_STATES, |states| {
                states.remove(module_id);
            })
            .await
    }

    /// Forget every persisted flag.
    pub async fn clear(&self) -> AppResult<()> {
        self.store
            .set(keys::MODULE_STATES, Value::Object(Default::default()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn make_states() -> ModuleStates {
        ModuleStates::new(Arc::new(Store::in_memory().await.unwrap()))
    }

    #[tokio::test]
    async fn test_default_resolution() {
        let states = make_states().await;
        assert!(states.is_enabled("addMalLink", false));
        assert!(!states.is_enabled("hideGlobalFeed", true));
    }

    #[tokio::test]
    async fn test_persisted_flag_wins() {
        let states = make_states().await;
        states.set("hideGlobalFeed", true).await.unwrap();
        states.set("addMalLink", false).await.unwrap();
        assert!(states.is_enabled("hideGlobalFeed", true));
        assert!(!states.is_enabled("addMalLink", false));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let states = make_states().await;
        states.set("a", false).await.unwrap();
        states.set("b", false).await.unwrap();

        states.remove("a").await.unwrap();
        assert_eq!(states.get("a"), None);
        assert_eq!(states.get("b"), Some(false));

        states.clear().await.unwrap();
        assert_eq!(states.get("b"), None);
    }
}
