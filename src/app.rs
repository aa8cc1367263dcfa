//! Wiring of stores, caches, API clients and registries.

use std::sync::Arc;

use tracing::info;

use alextras_cache::CacheManager;
use alextras_core::config::AppConfig;
use alextras_core::traits::MediaResolver;
use alextras_core::types::SiteSurface;
use alextras_core::{AppError, AppResult};
use alextras_module::{
    EventBus, LifecycleOrchestrator, MemoryStyleSheets, ModuleRegistry, PageModule,
    SecondaryLoader,
};
use alextras_resolver::{AniListApi, ApiClient, IdResolver, JikanApi};
use alextras_store::{Store, keys};

use crate::modules;
use crate::page::PageOverlay;

/// Shared services of one process.
pub struct App {
    pub config: AppConfig,
    pub store: Arc<Store>,
    pub cache: Arc<CacheManager>,
    pub anilist: AniListApi,
    pub jikan: JikanApi,
    pub resolver: Arc<IdResolver>,
    pub overlay: Arc<PageOverlay>,
    pub styles: Arc<MemoryStyleSheets>,
    pub bus: Arc<EventBus>,
}

impl App {
    /// Open the file-backed store named in the configuration and wire everything.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        let store = Arc::new(Store::open_file(&config.store).await?);
        Self::with_store(config, store).await
    }

    /// Wire everything around an already opened store.
    pub async fn with_store(config: AppConfig, store: Arc<Store>) -> AppResult<Self> {
        let cache = Arc::new(CacheManager::new(&config.cache).await?);
        let client = ApiClient::new(&config.api)?;
        let token = store.get_typed::<String>(keys::API_TOKEN);

        let anilist = AniListApi::new(client.clone(), cache.clone()).with_token(token);
        let jikan = JikanApi::new(client, cache.clone());
        let resolver = Arc::new(IdResolver::new(anilist.clone(), cache.clone()));

        Ok(Self {
            config,
            store,
            cache,
            anilist,
            jikan,
            resolver,
            overlay: Arc::new(PageOverlay::new()),
            styles: Arc::new(MemoryStyleSheets::new()),
            bus: Arc::new(EventBus::default()),
        })
    }

    /// Whether the persisted `verboseLogging` toggle is on.
    pub fn verbose_logging(&self) -> bool {
        self.store
            .get_typed::<bool>(keys::VERBOSE_LOGGING)
            .unwrap_or(false)
    }

    fn modules(&self, surface: SiteSurface) -> Vec<Arc<dyn PageModule>> {
        match surface {
            SiteSurface::Primary => modules::primary_modules(self),
            SiteSurface::Secondary => modules::secondary_modules(self),
        }
    }

    /// A registry of `surface` with every shipped module registered.
    pub fn registry(&self, surface: SiteSurface) -> Arc<ModuleRegistry> {
        let registry = Arc::new(ModuleRegistry::new(
            surface,
            self.store.clone(),
            self.bus.clone(),
            self.styles.clone(),
        ));
        for module in self.modules(surface) {
            registry.register(module);
        }
        info!(surface = %surface, modules = registry.len(), "Registry ready");
        registry
    }

    /// The registry holding `module_id`, on whichever surface it lives.
    pub fn registry_of(&self, module_id: &str) -> AppResult<Arc<ModuleRegistry>> {
        [SiteSurface::Primary, SiteSurface::Secondary]
            .into_iter()
            .map(|surface| self.registry(surface))
            .find(|registry| registry.get(module_id).is_some())
            .ok_or_else(|| AppError::not_found(format!("Module '{module_id}' is not registered")))
    }

    /// Ids of every shipped module, across both surfaces.
    pub fn module_ids(&self) -> Vec<String> {
        [SiteSurface::Primary, SiteSurface::Secondary]
            .into_iter()
            .flat_map(|surface| self.modules(surface))
            .map(|module| module.descriptor().id)
            .collect()
    }

    /// Orchestrator of the primary site.
    pub fn orchestrator(&self) -> Arc<LifecycleOrchestrator> {
        Arc::new(LifecycleOrchestrator::new(
            self.registry(SiteSurface::Primary),
            Some(self.resolver.clone() as Arc<dyn MediaResolver>),
            &self.config.loader,
        ))
    }

    /// One-shot loader of the secondary site.
    pub fn secondary_loader(&self) -> SecondaryLoader {
        SecondaryLoader::new(self.registry(SiteSurface::Secondary), &self.config.loader)
    }
}
