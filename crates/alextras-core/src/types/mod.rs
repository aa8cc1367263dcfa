//! Core type definitions used across the AniList Extras workspace.

pub mod media;
pub mod page;
pub mod settings;
pub mod surface;

pub use media::{IdKind, MediaContext, MediaType};
pub use page::PageUrl;
pub use settings::{SettingDescriptor, SettingKind, SettingsSchema, TextVariant};
pub use surface::SiteSurface;
