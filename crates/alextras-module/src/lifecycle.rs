//! The per-module unload → validate → load cycle shared by the orchestrator
//! and the secondary-site loader.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use alextras_core::events::ModuleEvent;
use alextras_core::types::PageUrl;

use crate::context::{NavigationContext, UnloadContext};
use crate::registry::{ModuleEntry, ModuleRegistry};

/// What happened to one module during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleOutcome {
    /// The module is disabled.
    Disabled,
    /// The module stayed active without being reloaded.
    Retained,
    /// `validate` returned false.
    NotApplicable,
    /// `validate` failed.
    ValidateFailed,
    /// A dependency did not become active in time.
    DependencyTimeout,
    /// A newer navigation superseded this one before `load`.
    Abandoned,
    /// `load` completed.
    Loaded,
    /// `load` failed; the module still counts as active.
    LoadFailed,
}

/// Per-module outcomes of one cycle, in registration order.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// Generation of the navigation (0 on the secondary surface).
    pub generation: u64,
    /// The page the cycle ran for.
    pub current_page: PageUrl,
    /// Module id and outcome, in registration order.
    pub outcomes: Vec<(String, ModuleOutcome)>,
}

impl CycleReport {
    /// The outcome of one module.
    pub fn outcome(&self, module_id: &str) -> Option<ModuleOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == module_id)
            .map(|(_, outcome)| *outcome)
    }

    /// Ids of the modules that ran `load` during the cycle.
    pub fn loaded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ModuleOutcome::Loaded | ModuleOutcome::LoadFailed))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Run a module callback, turning errors and panics into a message.
pub(crate) async fn guarded<T, F>(fut: F) -> Result<T, String>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{e:#}")),
        Err(panic) => Err(panic_message(panic.as_ref())),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Tear down an active module. The module leaves the Active Set whatever
/// the outcome.
pub(crate) async fn unload_module(
    registry: &ModuleRegistry,
    entry: &ModuleEntry,
    ctx: &UnloadContext,
) {
    let id = entry.id();
    let module = entry.module();

    if !module.has_unload() {
        registry.active().remove(id);
        debug!(module_id = %id, "Dropped module without unload from active set");
        return;
    }

    let start = Instant::now();
    let result = guarded(module.unload(ctx)).await;
    registry.active().remove(id);

    match result {
        Ok(()) => {
            let elapsed_ms = elapsed_ms(start);
            info!(module_id = %id, elapsed_ms, "Unloaded module");
            registry.emit(ModuleEvent::Unload {
                module_id: id.to_string(),
                elapsed_ms,
            });
        }
        Err(e) => {
            error!(module_id = %id, error = %e, "Module unload error");
            registry.emit(ModuleEvent::UnloadError {
                module_id: id.to_string(),
                error: e,
            });
        }
    }
}

/// Wait until every dependency has finished its unload phase for this
/// navigation and is active. Resolves to `false` on timeout.
async fn dependencies_ready(
    registry: &ModuleRegistry,
    ctx: &NavigationContext,
    depends_on: &[String],
    timeout: Duration,
) -> bool {
    let generation = ctx.token.generation();
    let ready = async {
        for id in depends_on {
            if let Some(dependency) = registry.get(id) {
                dependency.settled_through(generation).await;
            }
        }
        registry.active().wait_for_all(depends_on, timeout).await
    };
    tokio::time::timeout(timeout, ready).await.unwrap_or(false)
}

/// Run the full cycle of one module for one navigation.
pub(crate) async fn run_module(
    registry: Arc<ModuleRegistry>,
    entry: Arc<ModuleEntry>,
    ctx: Arc<NavigationContext>,
    dependency_timeout: Duration,
) -> ModuleOutcome {
    let _guard = entry.lock().await;
    let id = entry.id();
    let module = entry.module();
    let descriptor = entry.descriptor();

    if entry.is_disabled() {
        return ModuleOutcome::Disabled;
    }

    if let Some(css) = &descriptor.styles {
        registry.styles().insert(&descriptor.style_key(), css);
    }

    if registry.surface().supports_unload() && registry.active().contains(id) {
        let unload_ctx = ctx.unload_context();
        let should_unload = match guarded(module.validate_unload(&unload_ctx)).await {
            Ok(should) => should,
            Err(e) => {
                warn!(module_id = %id, error = %e, "validate_unload failed, unloading");
                true
            }
        };
        if should_unload {
            unload_module(&registry, &entry, &unload_ctx).await;
        }
    }

    entry.settle(ctx.token.generation());

    if registry.active().contains(id) {
        debug!(module_id = %id, "Module stays active");
        return ModuleOutcome::Retained;
    }

    if !descriptor.depends_on.is_empty() {
        let ready = tokio::select! {
            ready = dependencies_ready(&registry, &ctx, &descriptor.depends_on, dependency_timeout) => ready,
            _ = ctx.token.superseded() => return ModuleOutcome::Abandoned,
        };
        if !ready {
            warn!(
                module_id = %id,
                depends_on = ?descriptor.depends_on,
                "Dependencies did not become active in time"
            );
            return ModuleOutcome::DependencyTimeout;
        }
    }

    match guarded(module.validate(&ctx)).await {
        Ok(true) => {
            registry.emit(ModuleEvent::Validate {
                module_id: id.to_string(),
            });
        }
        Ok(false) => return ModuleOutcome::NotApplicable,
        Err(e) => {
            error!(module_id = %id, error = %e, "Module validate error");
            registry.emit(ModuleEvent::ValidateError {
                module_id: id.to_string(),
                error: e,
            });
            return ModuleOutcome::ValidateFailed;
        }
    }

    if !ctx.is_current() {
        debug!(
            module_id = %id,
            generation = ctx.token.generation(),
            "Navigation superseded, skipping load"
        );
        return ModuleOutcome::Abandoned;
    }
    if entry.is_disabled() {
        return ModuleOutcome::Disabled;
    }

    let start = Instant::now();
    let result = guarded(module.load(&ctx)).await;
    let elapsed_ms = elapsed_ms(start);
    registry.active().insert(id);

    match result {
        Ok(()) => {
            info!(module_id = %id, elapsed_ms, "Loaded module");
            registry.emit(ModuleEvent::Load {
                module_id: id.to_string(),
                elapsed_ms,
            });
            ModuleOutcome::Loaded
        }
        Err(e) => {
            error!(module_id = %id, error = %e, elapsed_ms, "Module load error");
            registry.emit(ModuleEvent::LoadError {
                module_id: id.to_string(),
                error: e,
                elapsed_ms,
            });
            ModuleOutcome::LoadFailed
        }
    }
}

/// Spawn one task per enabled module and wait for all of them.
pub(crate) async fn run_all(
    registry: &Arc<ModuleRegistry>,
    ctx: Arc<NavigationContext>,
    dependency_timeout: Duration,
) -> CycleReport {
    let entries = registry.entries();
    let mut outcomes: Vec<(String, ModuleOutcome)> = entries
        .iter()
        .map(|e| (e.id().to_string(), ModuleOutcome::Disabled))
        .collect();

    let mut tasks = JoinSet::new();
    for (index, entry) in entries.into_iter().enumerate() {
        if entry.is_disabled() {
            continue;
        }
        let registry = registry.clone();
        let ctx = ctx.clone();
        tasks.spawn(async move {
            (index, run_module(registry, entry, ctx, dependency_timeout).await)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index].1 = outcome,
            Err(e) => error!(error = %e, "Module task failed"),
        }
    }

    CycleReport {
        generation: ctx.token.generation(),
        current_page: ctx.current_page.clone(),
        outcomes,
    }
}
