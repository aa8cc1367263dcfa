//! Core traits defined in `alextras-core` and implemented by other crates.

pub mod cache;
pub mod navigation;
pub mod resolver;

pub use cache::{ExpiringCache, ExpiringCacheExt};
pub use navigation::{NavigationSource, NavigationStream};
pub use resolver::MediaResolver;
