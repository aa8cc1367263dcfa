//! # alextras-resolver
//!
//! HTTP clients for the primary site's GraphQL API and the secondary
//! site's REST mirror, plus [`IdResolver`], the cached cross-reference
//! lookup used by the lifecycle engine.

pub mod anilist;
pub mod client;
pub mod jikan;
pub mod resolver;

pub use anilist::AniListApi;
pub use client::{ApiClient, ApiResponse};
pub use jikan::JikanApi;
pub use resolver::IdResolver;
