//! # alextras-core
//!
//! Core crate for AniList Extras. Contains shared traits, configuration
//! schemas, navigation and media types, the module settings schema,
//! lifecycle events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other AniList Extras crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
