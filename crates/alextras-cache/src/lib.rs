//! # alextras-cache
//!
//! Expiring cache implementations for AniList Extras. Supports two modes:
//!
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka)
//!   with a per-entry time-to-live
//! - **disk**: One JSON file per store, surviving restarts; expired entries
//!   are purged the first time a store is opened
//!
//! The provider is selected at runtime based on configuration.

#[cfg(feature = "disk")]
pub mod disk;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use provider::CacheManager;
