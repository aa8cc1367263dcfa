//! Scoped module style sheets.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

/// Where module style sheets are inserted.
///
/// Both operations are idempotent and keyed by the sheet key.
pub trait StyleSink: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a sheet unless one with the same key exists. Returns `true` if inserted.
    fn insert(&self, key: &str, css: &str) -> bool;

    /// Remove a sheet. Returns `true` if it existed.
    fn remove(&self, key: &str) -> bool;

    /// Whether a sheet with this key is present.
    fn contains(&self, key: &str) -> bool;
}

/// In-memory style sheets.
#[derive(Debug, Default)]
pub struct MemoryStyleSheets {
    sheets: DashMap<String, String>,
}

impl MemoryStyleSheets {
    /// Create an empty sheet set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys of the present sheets, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.sheets.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// The CSS of a sheet.
    pub fn get(&self, key: &str) -> Option<String> {
        self.sheets.get(key).map(|css| css.value().clone())
    }
}

impl StyleSink for MemoryStyleSheets {
    fn insert(&self, key: &str, css: &str) -> bool {
        match self.sheets.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(css.to_string());
                debug!(key, bytes = css.len(), "Inserted style sheet");
                true
            }
        }
    }

    fn remove(&self, key: &str) -> bool {
        self.sheets.remove(key).is_some()
    }

    fn contains(&self, key: &str) -> bool {
        self.sheets.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let sheets = MemoryStyleSheets::new();
        assert!(sheets.insert("k", "a {}"));
        assert!(!sheets.insert("k", "b {}"));
        assert_eq!(sheets.get("k").as_deref(), Some("a {}"));
        assert!(sheets.remove("k"));
        assert!(!sheets.contains("k"));
    }
}
