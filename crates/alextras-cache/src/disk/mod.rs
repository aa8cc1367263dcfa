//! Expiring cache persisted as one JSON file per store.

pub mod store;

pub use store::DiskCacheProvider;
