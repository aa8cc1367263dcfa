//! Link from a primary-site entry to the same entry on the secondary site.

use std::sync::Arc;

use async_trait::async_trait;

use alextras_core::config::site::SiteConfig;
use alextras_module::{ModuleDescriptor, ModuleTag, NavigationContext, PageModule, UnloadContext};

use crate::page::{Element, PageOverlay};

use super::{entry_changed, entry_url};

pub const ID: &str = "addMalLink";

/// Overlay element holding the link.
pub const LINK_ELEMENT: &str = "alextras--mal-link";

pub struct AddMalLink {
    overlay: Arc<PageOverlay>,
    secondary_host: String,
}

impl AddMalLink {
    pub fn new(overlay: Arc<PageOverlay>, sites: &SiteConfig) -> Self {
        Self {
            overlay,
            secondary_host: sites.secondary_host.clone(),
        }
    }
}

#[async_trait]
impl PageModule for AddMalLink {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor::new(ID, "MyAnimeList Link")
            .description("Adds a link to MyAnimeList on anime/manga pages.")
            .tags(&[ModuleTag::Media, ModuleTag::Links])
    }

    async fn validate(&self, ctx: &NavigationContext) -> anyhow::Result<bool> {
        Ok(ctx.media.is_entry())
    }

    async fn validate_unload(&self, ctx: &UnloadContext) -> anyhow::Result<bool> {
        Ok(entry_changed(ctx))
    }

    async fn load(&self, ctx: &NavigationContext) -> anyhow::Result<()> {
        let (Some(media_type), Some(mal_id)) = (ctx.media.media_type, ctx.media.mal_id) else {
            return Ok(());
        };

        self.overlay.insert(
            LINK_ELEMENT,
            Element::link(
                "MyAnimeList",
                entry_url(&self.secondary_host, media_type.as_str(), mal_id),
            ),
        );
        Ok(())
    }

    fn has_unload(&self) -> bool {
        true
    }

    async fn unload(&self, _ctx: &UnloadContext) -> anyhow::Result<()> {
        self.overlay.remove(LINK_ELEMENT);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::page;
    use alextras_core::types::{MediaContext, MediaType};
    use alextras_module::GenerationToken;

    fn context(href: &str, mal_id: Option<u64>) -> NavigationContext {
        let current = page(href);
        let mut media = MediaContext::from_page(&current);
        media.mal_id = mal_id;
        NavigationContext::new(current, None, media, GenerationToken::detached())
    }

    #[tokio::test]
    async fn test_load_inserts_link() {
        let overlay = Arc::new(PageOverlay::new());
        let module = AddMalLink::new(overlay.clone(), &SiteConfig::default());
        let ctx = context("https://anilist.co/anime/21/One-Piece", Some(21));

        assert!(module.validate(&ctx).await.unwrap());
        module.load(&ctx).await.unwrap();

        let link = overlay.get(LINK_ELEMENT).unwrap();
        assert_eq!(link.href.as_deref(), Some("https://myanimelist.net/anime/21/"));
        assert_eq!(ctx.media.media_type, Some(MediaType::Anime));

        module.unload(&ctx.unload_context()).await.unwrap();
        assert!(!overlay.contains(LINK_ELEMENT));
    }

    #[tokio::test]
    async fn test_no_link_without_counterpart() {
        let overlay = Arc::new(PageOverlay::new());
        let module = AddMalLink::new(overlay.clone(), &SiteConfig::default());
        let ctx = context("https://anilist.co/manga/999999", None);

        module.load(&ctx).await.unwrap();
        assert!(overlay.is_empty());
    }

    #[tokio::test]
    async fn test_not_applicable_off_entries() {
        let module = AddMalLink::new(Arc::new(PageOverlay::new()), &SiteConfig::default());
        let ctx = context("https://anilist.co/search/anime", None);
        assert!(!module.validate(&ctx).await.unwrap());
    }
}
