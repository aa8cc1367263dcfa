//! Lifecycle events emitted by the module engine.
//!
//! Events are published on the event bus and consumed by settings-page
//! style collaborators, diagnostics, and tests.

pub mod module;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::surface::SiteSurface;

pub use module::{EventKind, ModuleEvent};

/// Wrapper for all lifecycle events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Surface whose registry produced the event.
    pub surface: SiteSurface,
    /// The event payload.
    pub payload: ModuleEvent,
}

impl LifecycleEvent {
    /// Create a new lifecycle event.
    pub fn new(surface: SiteSurface, payload: ModuleEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            surface,
            payload,
        }
    }

    /// Shortcut for the payload's kind.
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}
