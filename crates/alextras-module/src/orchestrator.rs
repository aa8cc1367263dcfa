//! Lifecycle orchestrator for the client-routed primary site.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use alextras_core::config::loader::LoaderConfig;
use alextras_core::events::ModuleEvent;
use alextras_core::traits::resolver::MediaResolver;
use alextras_core::types::{IdKind, MediaContext, PageUrl};

use crate::context::NavigationContext;
use crate::generation::{GenerationClock, GenerationToken};
use crate::lifecycle::{self, CycleReport};
use crate::registry::ModuleRegistry;

/// Runs the unload → validate → load cycle of every module on each navigation.
#[derive(Debug)]
pub struct LifecycleOrchestrator {
    registry: Arc<ModuleRegistry>,
    resolver: Option<Arc<dyn MediaResolver>>,
    clock: GenerationClock,
    dependency_timeout: Duration,
}

impl LifecycleOrchestrator {
    /// Create an orchestrator over a registry.
    ///
    /// Without a resolver, `media.mal_id` is never filled in.
    pub fn new(
        registry: Arc<ModuleRegistry>,
        resolver: Option<Arc<dyn MediaResolver>>,
        config: &LoaderConfig,
    ) -> Self {
        Self {
            registry,
            resolver,
            clock: GenerationClock::new(),
            dependency_timeout: config.dependency_timeout(),
        }
    }

    /// The registry driven by this orchestrator.
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// The generation clock; advanced once per detected navigation.
    pub fn clock(&self) -> &GenerationClock {
        &self.clock
    }

    /// Start a new generation and run its cycle.
    pub async fn navigate(&self, current_page: PageUrl, previous_page: Option<PageUrl>) -> CycleReport {
        let token = self.clock.advance();
        self.run_cycle(current_page, previous_page, token).await
    }

    /// Run one cycle for a navigation whose generation has already been minted.
    pub async fn run_cycle(
        &self,
        current_page: PageUrl,
        previous_page: Option<PageUrl>,
        token: GenerationToken,
    ) -> CycleReport {
        let generation = token.generation();
        info!(
            generation,
            current_page = %current_page,
            previous_page = previous_page.as_ref().map(|p| p.as_str()),
            "Navigated"
        );
        self.registry.emit(ModuleEvent::Navigate {
            current_page: current_page.to_string(),
            previous_page: previous_page.as_ref().map(|p| p.to_string()),
            generation,
        });

        let media = self.media_for(&current_page).await;
        if !token.is_current() {
            debug!(generation, "Navigation superseded while resolving media");
        }

        let ctx = Arc::new(NavigationContext::new(current_page, previous_page, media, token));
        self.registry.record_location(ctx.unload_context());

        lifecycle::run_all(&self.registry, ctx, self.dependency_timeout).await
    }

    /// Compute the media context shared by every module of a cycle.
    async fn media_for(&self, page: &PageUrl) -> MediaContext {
        let mut media = MediaContext::from_page(page);
        let (Some(media_type), Some(id), Some(resolver)) =
            (media.media_type, media.id, self.resolver.as_ref())
        else {
            return media;
        };

        match resolver
            .resolve_id(&id.to_string(), IdKind::AniList, IdKind::Mal, media_type.as_str())
            .await
        {
            Ok(mal_id) => media.mal_id = mal_id,
            Err(e) => {
                warn!(media_type = %media_type.as_str(), id, error = %e, "Failed to resolve MAL id");
            }
        }
        media
    }
}
