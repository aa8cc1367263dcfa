//! In-memory expiring cache backed by moka.

pub mod store;

pub use store::MemoryCacheProvider;
