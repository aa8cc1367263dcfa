//! Hides the global activity feed on the home page.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use alextras_core::config::loader::LoaderConfig;
use alextras_module::{ModuleDescriptor, ModuleTag, NavigationContext, PageModule, wait_until};

use crate::page::{Element, PageOverlay};

pub const ID: &str = "hideGlobalFeed";

/// Host-page element switching between the following and global feeds.
pub const FEED_TOGGLE: &str = "feed-type-toggle";

const STYLES: &str = ".activity-feed-wrap .feed-type-toggle > div:last-child { display: none; }";

/// Style-only module without teardown: it is validated and loaded again
/// on every navigation.
pub struct HideGlobalFeed {
    overlay: Arc<PageOverlay>,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl HideGlobalFeed {
    pub fn new(overlay: Arc<PageOverlay>, loader: &LoaderConfig) -> Self {
        Self {
            overlay,
            wait_timeout: loader.wait_timeout(),
            poll_interval: loader.poll_interval(),
        }
    }
}

#[async_trait]
impl PageModule for HideGlobalFeed {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor::new(ID, "Hide Global Feed")
            .description("Hides the global feed on the home page.")
            .tags(&[ModuleTag::Social, ModuleTag::Layout])
            .disabled_by_default()
            .styles(STYLES)
    }

    async fn validate(&self, ctx: &NavigationContext) -> anyhow::Result<bool> {
        Ok(ctx.current_page.path().starts_with("/home"))
    }

    async fn load(&self, _ctx: &NavigationContext) -> anyhow::Result<()> {
        let found = wait_until(
            || self.overlay.contains(FEED_TOGGLE),
            self.wait_timeout,
            self.poll_interval,
        )
        .await;
        if !found {
            return Ok(());
        }

        self.overlay.insert(FEED_TOGGLE, Element::text("Following"));
        Ok(())
    }
}
