//! # alextras-store
//!
//! The persistent key-value store of AniList Extras: a single namespaced
//! JSON blob with synchronous reads, asynchronous persistence and change
//! notification. On top of it sit the per-module enabled flags
//! ([`ModuleStates`]), the per-module [`SettingsManager`] and the
//! backup/restore helpers.

pub mod backend;
pub mod backup;
pub mod keys;
pub mod module_states;
pub mod settings;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StoreBackend};
pub use module_states::ModuleStates;
pub use settings::{SettingWatcher, SettingsManager};
pub use store::{Store, StoreChange, StoreWatcher};
