//! Module lifecycle event payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminant of a [`ModuleEvent`], used to filter listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A module was registered.
    Register,
    /// A module was unloaded.
    Unload,
    /// A module's unload failed.
    UnloadError,
    /// A module validated for the current page.
    Validate,
    /// A module's validate failed.
    ValidateError,
    /// A module was loaded.
    Load,
    /// A module's load failed.
    LoadError,
    /// A navigation started a lifecycle cycle.
    Navigate,
    /// A module was enabled.
    Enable,
    /// A module was disabled.
    Disable,
}

impl EventKind {
    /// Returns the wire name of this event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "module:register",
            Self::Unload => "module:unload",
            Self::UnloadError => "module:unload:error",
            Self::Validate => "module:validate",
            Self::ValidateError => "module:validate:error",
            Self::Load => "module:load",
            Self::LoadError => "module:load:error",
            Self::Navigate => "module:navigate",
            Self::Enable => "module:enable",
            Self::Disable => "module:disable",
        }
    }

    /// Whether this kind reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::UnloadError | Self::ValidateError | Self::LoadError)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events raised while modules move through their lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModuleEvent {
    /// A module was added to a registry.
    Register {
        /// The module ID.
        module_id: String,
    },
    /// A module's teardown completed.
    Unload {
        /// The module ID.
        module_id: String,
        /// Teardown duration in milliseconds.
        elapsed_ms: f64,
    },
    /// A module's teardown failed; it was dropped from the active set anyway.
    UnloadError {
        /// The module ID.
        module_id: String,
        /// The failure message.
        error: String,
    },
    /// A module applies to the current page.
    Validate {
        /// The module ID.
        module_id: String,
    },
    /// A module's validate failed; it is skipped for this navigation.
    ValidateError {
        /// The module ID.
        module_id: String,
        /// The failure message.
        error: String,
    },
    /// A module's setup completed.
    Load {
        /// The module ID.
        module_id: String,
        /// Setup duration in milliseconds.
        elapsed_ms: f64,
    },
    /// A module's setup failed; it still counts as active.
    LoadError {
        /// The module ID.
        module_id: String,
        /// The failure message.
        error: String,
        /// Time spent before failing, in milliseconds.
        elapsed_ms: f64,
    },
    /// A navigation was detected and a cycle started.
    Navigate {
        /// The new normalized location.
        current_page: String,
        /// The previous normalized location, if any.
        previous_page: Option<String>,
        /// Generation number minted for this navigation.
        generation: u64,
    },
    /// A module's persisted state switched to enabled.
    Enable {
        /// The module ID.
        module_id: String,
    },
    /// A module's persisted state switched to disabled.
    Disable {
        /// The module ID.
        module_id: String,
    },
}

impl ModuleEvent {
    /// The discriminant of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Register { .. } => EventKind::Register,
            Self::Unload { .. } => EventKind::Unload,
            Self::UnloadError { .. } => EventKind::UnloadError,
            Self::Validate { .. } => EventKind::Validate,
            Self::ValidateError { .. } => EventKind::ValidateError,
            Self::Load { .. } => EventKind::Load,
            Self::LoadError { .. } => EventKind::LoadError,
            Self::Navigate { .. } => EventKind::Navigate,
            Self::Enable { .. } => EventKind::Enable,
            Self::Disable { .. } => EventKind::Disable,
        }
    }

    /// The module the event refers to, if it is module-scoped.
    pub fn module_id(&self) -> Option<&str> {
        match self {
            Self::Register { module_id }
            | Self::Unload { module_id, .. }
            | Self::UnloadError { module_id, .. }
            | Self::Validate { module_id }
            | Self::ValidateError { module_id, .. }
            | Self::Load { module_id, .. }
            | Self::LoadError { module_id, .. }
            | Self::Enable { module_id }
            | Self::Disable { module_id } => Some(module_id),
            Self::Navigate { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(EventKind::LoadError.as_str(), "module:load:error");
        assert!(EventKind::UnloadError.is_error());
        assert!(!EventKind::Navigate.is_error());
    }

    #[test]
    fn test_module_id() {
        let event = ModuleEvent::Load {
            module_id: "addMalLink".to_string(),
            elapsed_ms: 1.5,
        };
        assert_eq!(event.kind(), EventKind::Load);
        assert_eq!(event.module_id(), Some("addMalLink"));

        let nav = ModuleEvent::Navigate {
            current_page: "https://anilist.co/home".to_string(),
            previous_page: None,
            generation: 1,
        };
        assert_eq!(nav.module_id(), None);
    }
}
