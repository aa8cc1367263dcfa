//! In-memory stand-in for the rendered page.
//!
//! Feature modules record what they would insert into the document here,
//! keyed by element id, so loads and unloads can be observed.

use dashmap::DashMap;
use serde::Serialize;

/// One inserted element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    /// Visible text.
    pub text: String,
    /// Link target, for anchors.
    pub href: Option<String>,
}

impl Element {
    /// A link element.
    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
        }
    }

    /// A plain text element.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct PageOverlay {
    elements: DashMap<String, Element>,
}

impl PageOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an element. Returns whether it was new.
    pub fn insert(&self, id: &str, element: Element) -> bool {
        self.elements.insert(id.to_string(), element).is_none()
    }

    /// Remove an element. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.elements.remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<Element> {
        self.elements.get(id).map(|e| e.value().clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Every element, sorted by id.
    pub fn snapshot(&self) -> Vec<(String, Element)> {
        let mut elements: Vec<_> = self
            .elements
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        elements.sort_by(|a, b| a.0.cmp(&b.0));
        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replace_remove() {
        let overlay = PageOverlay::new();
        assert!(overlay.insert("a", Element::text("one")));
        assert!(!overlay.insert("a", Element::text("two")));
        assert_eq!(overlay.get("a"), Some(Element::text("two")));
        assert!(overlay.remove("a"));
        assert!(!overlay.remove("a"));
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let overlay = PageOverlay::new();
        overlay.insert("b", Element::text("2"));
        overlay.insert("a", Element::link("1", "https://example.com"));
        let ids: Vec<_> = overlay.snapshot().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
