//! The set of modules currently loaded for the present page.

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::watch;

/// Active Set with change notification.
///
/// Modules that depend on another module's output wait for its id to
/// appear here instead of assuming any completion order.
#[derive(Debug)]
pub struct ActiveSet {
    tx: watch::Sender<HashSet<String>>,
}

impl ActiveSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(HashSet::new()),
        }
    }

    /// Whether `id` is active.
    pub fn contains(&self, id: &str) -> bool {
        self.tx.borrow().contains(id)
    }

    /// Mark `id` active. Returns `false` if it already was.
    pub fn insert(&self, id: &str) -> bool {
        self.tx.send_if_modified(|set| set.insert(id.to_string()))
    }

    /// Mark `id` inactive. Returns `false` if it was not active.
    pub fn remove(&self, id: &str) -> bool {
        self.tx.send_if_modified(|set| set.remove(id))
    }

    /// Active ids, sorted.
    pub fn snapshot(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.tx.borrow().iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of active modules.
    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    /// Whether no module is active.
    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Wait until every id in `ids` is active. Resolves to `false` on timeout.
    pub async fn wait_for_all(&self, ids: &[String], timeout: Duration) -> bool {
        let mut rx = self.tx.subscribe();
        let wait = rx.wait_for(|set| ids.iter().all(|id| set.contains(id)));
        matches!(tokio::time::timeout(timeout, wait).await, Ok(Ok(_)))
    }

    /// Wait until `id` is active. Resolves to `false` on timeout.
    pub async fn wait_for(&self, id: &str, timeout: Duration) -> bool {
        self.wait_for_all(&[id.to_string()], timeout).await
    }
}

impl Default for ActiveSet {
    fn default() -> Self {
        Self::new()
    }
}
