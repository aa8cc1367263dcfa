//! # alextras-module
//!
//! Module lifecycle engine for AniList Extras. Provides:
//!
//! - The [`PageModule`] contract and [`ModuleDescriptor`]
//! - A per-surface [`ModuleRegistry`] with persisted enabled state
//! - The Active Set and its wait primitive
//! - An [`EventBus`] for lifecycle events
//! - The [`LifecycleOrchestrator`] and [`NavigationWatcher`] for the primary site
//! - The one-shot [`SecondaryLoader`] for the secondary site

pub mod active;
pub mod bus;
pub mod context;
pub mod descriptor;
pub mod generation;
pub mod lifecycle;
pub mod orchestrator;
pub mod registry;
pub mod secondary;
pub mod styles;
pub mod traits;
pub mod wait;
pub mod watcher;

pub use active::ActiveSet;
pub use bus::{EventBus, ListenerId};
pub use context::{NavigationContext, UnloadContext};
pub use descriptor::{ModuleDescriptor, ModuleTag};
pub use generation::{GenerationClock, GenerationToken};
pub use lifecycle::{CycleReport, ModuleOutcome};
pub use orchestrator::LifecycleOrchestrator;
pub use registry::{ModuleEntry, ModuleInfo, ModuleRegistry};
pub use secondary::SecondaryLoader;
pub use styles::{MemoryStyleSheets, StyleSink};
pub use traits::PageModule;
pub use wait::wait_until;
pub use watcher::{ChannelNavigationSource, NavigationChange, NavigationWatcher};
