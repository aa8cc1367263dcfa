//! Static description of a module.

use std::fmt;

use serde::{Deserialize, Serialize};

use alextras_core::error::AppError;
use alextras_core::types::SettingsSchema;

/// Display category of a module. Tags have no behavioral effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleTag {
    /// Applies to anime entries.
    Anime,
    /// Applies to manga entries.
    Manga,
    /// Applies to entry pages in general.
    Media,
    /// Applies to user profiles.
    Profile,
    /// Applies to social pages (activities, forum, reviews).
    Social,
    /// Adds links to the other site.
    Links,
    /// Adds scores or ratings.
    Scores,
    /// Adds or changes page layout.
    Layout,
    /// Global behavior not tied to one page.
    Global,
}

impl fmt::Display for ModuleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
            Self::Media => "media",
            Self::Profile => "profile",
            Self::Social => "social",
            Self::Links => "links",
            Self::Scores => "scores",
            Self::Layout => "layout",
            Self::Global => "global",
        };
        f.write_str(name)
    }
}

/// Identity, metadata, capability flags, settings and styles of a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Stable id; also the storage key of the module's state and settings.
    pub id: String,
    /// Display name.
    pub name: String,
    /// What the module does.
    pub description: String,
    /// Free-text operator notice.
    pub notice: Option<String>,
    /// Display categories.
    pub tags: Vec<ModuleTag>,
    /// Whether the user may disable the module independently.
    pub toggleable: bool,
    /// Whether the module ships disabled.
    pub disabled_default: bool,
    /// Typed settings of the module.
    pub settings: SettingsSchema,
    /// Style sheet inserted while the module is enabled.
    pub styles: Option<String>,
    /// Modules that must be active before this one validates.
    pub depends_on: Vec<String>,
}

impl ModuleDescriptor {
    /// Start a descriptor with an id and a display name.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            toggleable: true,
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Set the operator notice.
    pub fn notice(mut self, notice: &str) -> Self {
        self.notice = Some(notice.to_string());
        self
    }

    /// Set the display tags.
    pub fn tags(mut self, tags: &[ModuleTag]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    /// Set whether the module may be toggled by the user.
    pub fn toggleable(mut self, toggleable: bool) -> Self {
        self.toggleable = toggleable;
        self
    }

    /// Ship the module disabled.
    pub fn disabled_by_default(mut self) -> Self {
        self.disabled_default = true;
        self
    }

    /// Set the settings schema.
    pub fn settings(mut self, settings: SettingsSchema) -> Self {
        self.settings = settings;
        self
    }

    /// Set the scoped style sheet.
    pub fn styles(mut self, styles: &str) -> Self {
        self.styles = Some(styles.to_string());
        self
    }

    /// Declare modules that must be active first.
    pub fn depends_on(mut self, ids: &[&str]) -> Self {
        self.depends_on = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    /// Check the descriptor before registration.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.id.trim().is_empty() {
            return Err(AppError::validation("Module id is required"));
        }
        if self.depends_on.iter().any(|dep| dep == &self.id) {
            return Err(AppError::validation(format!(
                "Module '{}' depends on itself",
                self.id
            )));
        }
        self.settings.validate().map_err(|e| {
            AppError::validation(format!(
                "Module '{}' has an invalid settings schema: {}",
                self.id, e.message
            ))
        })
    }

    /// Key of the module's scoped style sheet.
    pub fn style_key(&self) -> String {
        style_key(&self.id)
    }
}

/// Key of a module's scoped style sheet.
pub fn style_key(module_id: &str) -> String {
    format!("alextras--module-{module_id}-styles")
}
