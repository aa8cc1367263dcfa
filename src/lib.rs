//! # alextras
//!
//! Wiring of the engine crates, logging setup and the feature modules
//! shipped with the command line.

pub mod app;
pub mod logging;
pub mod modules;
pub mod page;

pub use app::App;
pub use page::{Element, PageOverlay};
