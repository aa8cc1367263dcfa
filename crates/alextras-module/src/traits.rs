//! The contract every feature module implements.

use async_trait::async_trait;

use crate::context::{NavigationContext, UnloadContext};
use crate::descriptor::ModuleDescriptor;

/// A page-scoped feature module.
///
/// Callbacks return `anyhow::Result`; the engine turns errors and panics
/// into lifecycle error events and never lets them reach other modules.
#[async_trait]
pub trait PageModule: Send + Sync + 'static {
    /// Returns the module descriptor. Called once, at registration.
    fn descriptor(&self) -> ModuleDescriptor;

    /// Whether the module applies to the page described by `ctx`.
    async fn validate(&self, ctx: &NavigationContext) -> anyhow::Result<bool>;

    /// Whether an active module must be torn down for this navigation.
    ///
    /// The default tears down on every navigation.
    async fn validate_unload(&self, _ctx: &UnloadContext) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Install the module on the current page. Must be idempotent.
    async fn load(&self, ctx: &NavigationContext) -> anyhow::Result<()>;

    /// Whether the module implements [`PageModule::unload`].
    ///
    /// Modules without teardown are re-entrant: they leave the active set on
    /// every navigation and are simply validated and loaded again.
    fn has_unload(&self) -> bool {
        false
    }

    /// Remove everything `load` installed.
    async fn unload(&self, _ctx: &UnloadContext) -> anyhow::Result<()> {
        Ok(())
    }
}
