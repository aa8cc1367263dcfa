//! One-shot loader for the secondary site.
//!
//! The secondary site rebuilds its document on every navigation, so the
//! cycle runs exactly once per page: no previous page, no unload phase and
//! no staleness.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use alextras_core::config::loader::LoaderConfig;
use alextras_core::events::ModuleEvent;
use alextras_core::types::{MediaContext, PageUrl};

use crate::context::NavigationContext;
use crate::generation::GenerationToken;
use crate::lifecycle::{self, CycleReport};
use crate::registry::ModuleRegistry;

/// Loads the secondary-site modules for one page.
#[derive(Debug)]
pub struct SecondaryLoader {
    registry: Arc<ModuleRegistry>,
    dependency_timeout: Duration,
}

impl SecondaryLoader {
    /// Create a loader over a registry.
    pub fn new(registry: Arc<ModuleRegistry>, config: &LoaderConfig) -> Self {
        Self {
            registry,
            dependency_timeout: config.dependency_timeout(),
        }
    }

    /// Run the cycle for `page`. Consumes the loader: a page loads once.
    pub async fn run_once(self, page: PageUrl) -> CycleReport {
        info!(current_page = %page, "Navigated");
        self.registry.emit(ModuleEvent::Navigate {
            current_page: page.to_string(),
            previous_page: None,
            generation: 0,
        });

        let ctx = Arc::new(NavigationContext::new(
            page,
            None,
            MediaContext::default(),
            GenerationToken::detached(),
        ));
        lifecycle::run_all(&self.registry, ctx, self.dependency_timeout).await
    }
}
