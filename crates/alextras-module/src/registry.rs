//! Module registry: registered modules of one site-surface, their persisted
//! enabled state, the Active Set and the event bus.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::{error, info};

use alextras_core::error::AppError;
use alextras_core::events::{LifecycleEvent, ModuleEvent};
use alextras_core::result::AppResult;
use alextras_core::types::SiteSurface;
use alextras_store::{ModuleStates, SettingsManager, Store};

use crate::active::ActiveSet;
use crate::bus::EventBus;
use crate::context::UnloadContext;
use crate::descriptor::ModuleDescriptor;
use crate::lifecycle;
use crate::styles::StyleSink;
use crate::traits::PageModule;

/// A registered module with its runtime state.
pub struct ModuleEntry {
    descriptor: ModuleDescriptor,
    module: Arc<dyn PageModule>,
    disabled: AtomicBool,
    /// Held for the duration of any lifecycle phase of this module.
    lifecycle: Mutex<()>,
    /// Latest generation whose unload phase has finished.
    settled: watch::Sender<u64>,
}

impl std::fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("id", &self.descriptor.id)
            .field("disabled", &self.is_disabled())
            .finish()
    }
}

impl ModuleEntry {
    /// The module id.
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// The descriptor captured at registration.
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// The module implementation.
    pub fn module(&self) -> &Arc<dyn PageModule> {
        &self.module
    }

    /// Whether the module is currently disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Flip the disabled flag; returns the previous value.
    fn set_disabled(&self, disabled: bool) -> bool {
        self.disabled.swap(disabled, Ordering::SeqCst)
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lifecycle.lock().await
    }

    /// Record that the unload phase of `generation` is over.
    pub(crate) fn settle(&self, generation: u64) {
        self.settled.send_if_modified(|settled| {
            if *settled < generation {
                *settled = generation;
                true
            } else {
                false
            }
        });
    }

    /// Wait until the unload phase of `generation` (or a newer one) is over.
    pub(crate) async fn settled_through(&self, generation: u64) {
        let mut rx = self.settled.subscribe();
        let _ = rx.wait_for(|settled| *settled >= generation).await;
    }
}

/// A registered module as seen by the settings-page collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleInfo {
    /// The descriptor.
    pub descriptor: ModuleDescriptor,
    /// Effective enabled state.
    pub enabled: bool,
    /// Whether the module is in the Active Set.
    pub active: bool,
}

/// Registry of the modules of one site-surface.
#[derive(Debug)]
pub struct ModuleRegistry {
    surface: SiteSurface,
    /// Entries in registration order.
    entries: RwLock<Vec<Arc<ModuleEntry>>>,
    active: ActiveSet,
    bus: Arc<EventBus>,
    styles: Arc<dyn StyleSink>,
    store: Arc<Store>,
    states: ModuleStates,
    /// Location of the latest cycle, used when a disable tears a module down.
    location: RwLock<Option<UnloadContext>>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new(
        surface: SiteSurface,
        store: Arc<Store>,
        bus: Arc<EventBus>,
        styles: Arc<dyn StyleSink>,
    ) -> Self {
        Self {
            surface,
            entries: RwLock::new(Vec::new()),
            active: ActiveSet::new(),
            bus,
            styles,
            states: ModuleStates::new(store.clone()),
            store,
            location: RwLock::new(None),
        }
    }

    /// The surface this registry serves.
    pub fn surface(&self) -> SiteSurface {
        self.surface
    }

    /// The Active Set.
    pub fn active(&self) -> &ActiveSet {
        &self.active
    }

    /// The event bus.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The style sink.
    pub fn styles(&self) -> &Arc<dyn StyleSink> {
        &self.styles
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Register a module.
    ///
    /// A missing or duplicate id, or an invalid descriptor, is logged and
    /// the call is a no-op. Returns whether the module was registered.
    pub fn register(&self, module: Arc<dyn PageModule>) -> bool {
        let descriptor = module.descriptor();
        if let Err(e) = descriptor.validate() {
            error!(surface = %self.surface.as_str(), error = %e, "Module registration rejected");
            return false;
        }

        let id = descriptor.id.clone();
        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if entries.iter().any(|e| e.id() == id) {
                error!(
                    surface = %self.surface.as_str(),
                    module_id = %id,
                    "Module is already registered"
                );
                return false;
            }

            let enabled = self.states.is_enabled(&id, descriptor.disabled_default);
            info!(
                surface = %self.surface.as_str(),
                module_id = %id,
                name = %descriptor.name,
                enabled,
                "Registering module"
            );

            entries.push(Arc::new(ModuleEntry {
                descriptor,
                module,
                disabled: AtomicBool::new(!enabled),
                lifecycle: Mutex::new(()),
                settled: watch::Sender::new(0),
            }));
        }

        self.emit(ModuleEvent::Register { module_id: id });
        true
    }

    /// Look up a registered module.
    pub fn get(&self, id: &str) -> Option<Arc<ModuleEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|e| e.id() == id)
            .cloned()
    }

    fn require(&self, id: &str) -> AppResult<Arc<ModuleEntry>> {
        self.get(id)
            .ok_or_else(|| AppError::not_found(format!("Module '{id}' is not registered")))
    }

    /// All entries in registration order.
    pub fn entries(&self) -> Vec<Arc<ModuleEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.entries().iter().map(|e| e.id().to_string()).collect()
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every module with its enabled state and Active Set membership.
    pub fn list(&self) -> Vec<ModuleInfo> {
        self.entries()
            .into_iter()
            .map(|e| ModuleInfo {
                enabled: !e.is_disabled(),
                active: self.active.contains(e.id()),
                descriptor: e.descriptor.clone(),
            })
            .collect()
    }

    /// Whether a registered module is enabled.
    pub fn is_enabled(&self, id: &str) -> Option<bool> {
        self.get(id).map(|e| !e.is_disabled())
    }

    /// Enable a module: persist the flag and insert its style sheet.
    pub async fn enable(&self, id: &str) -> AppResult<()> {
        let entry = self.require(id)?;
        if !entry.set_disabled(false) {
            return Ok(());
        }

        self.states.set(id, true).await?;
        if let Some(css) = &entry.descriptor.styles {
            self.styles.insert(&entry.descriptor.style_key(), css);
        }
        info!(surface = %self.surface.as_str(), module_id = %id, "Module enabled");
        self.emit(ModuleEvent::Enable {
            module_id: id.to_string(),
        });
        Ok(())
    }

    /// Disable a module: persist the flag, remove its style sheet and tear it
    /// down if it is active.
    pub async fn disable(&self, id: &str) -> AppResult<()> {
        let entry = self.require(id)?;
        if !entry.descriptor.toggleable {
            return Err(AppError::validation(format!(
                "Module '{id}' cannot be disabled"
            )));
        }
        if entry.set_disabled(true) {
            return Ok(());
        }

        self.states.set(id, false).await?;
        self.styles.remove(&entry.descriptor.style_key());
        info!(surface = %self.surface.as_str(), module_id = %id, "Module disabled");
        self.emit(ModuleEvent::Disable {
            module_id: id.to_string(),
        });

        if self.surface.supports_unload() && self.active.contains(id) {
            let _guard = entry.lock().await;
            if self.active.contains(id) {
                match self.last_location() {
                    Some(ctx) => lifecycle::unload_module(self, &entry, &ctx).await,
                    None => {
                        self.active.remove(id);
                    }
                }
            }
        }
        Ok(())
    }

    /// Settings of a registered module.
    pub fn settings(&self, id: &str) -> AppResult<SettingsManager> {
        let entry = self.require(id)?;
        Ok(SettingsManager::new(
            id,
            entry.descriptor.settings.clone(),
            self.store.clone(),
        ))
    }

    pub(crate) fn emit(&self, payload: ModuleEvent) {
        self.bus.emit(LifecycleEvent::new(self.surface, payload));
    }

    pub(crate) fn record_location(&self, ctx: UnloadContext) {
        *self.location.write().unwrap_or_else(PoisonError::into_inner) = Some(ctx);
    }

    fn last_location(&self) -> Option<UnloadContext> {
        self.location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
