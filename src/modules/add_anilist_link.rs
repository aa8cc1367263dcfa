//! Link from a secondary-site entry back to the primary site.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use alextras_core::config::site::SiteConfig;
use alextras_core::traits::MediaResolver;
use alextras_core::types::IdKind;
use alextras_module::{ModuleDescriptor, ModuleTag, NavigationContext, PageModule};

use crate::page::{Element, PageOverlay};

use super::entry_url;

pub const ID: &str = "addAniListLink";

/// Overlay element holding the link.
pub const LINK_ELEMENT: &str = "alextras--anilist-link";

// Matches `/anime/21/One_Piece` and `/anime.php?id=21`.
static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(anime|manga)(?:/|\.php\?id=)(\d+)").expect("static regex")
});

pub struct AddAniListLink {
    overlay: Arc<PageOverlay>,
    resolver: Arc<dyn MediaResolver>,
    primary_host: String,
}

impl AddAniListLink {
    pub fn new(overlay: Arc<PageOverlay>, resolver: Arc<dyn MediaResolver>, sites: &SiteConfig) -> Self {
        Self {
            overlay,
            resolver,
            primary_host: sites.primary_host.clone(),
        }
    }
}

/// `(type, id)` of a secondary-site entry page.
fn entry(ctx: &NavigationContext) -> Option<(String, String)> {
    let url = ctx.current_page.url();
    let target = match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    };
    let caps = ENTRY.captures(&target)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

#[async_trait]
impl PageModule for AddAniListLink {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor::new(ID, "AniList Link")
            .description("Adds a link to AniList on MyAnimeList anime/manga pages.")
            .tags(&[ModuleTag::Media, ModuleTag::Links])
    }

    async fn validate(&self, ctx: &NavigationContext) -> anyhow::Result<bool> {
        Ok(entry(ctx).is_some())
    }

    async fn load(&self, ctx: &NavigationContext) -> anyhow::Result<()> {
        if self.overlay.contains(LINK_ELEMENT) {
            return Ok(());
        }
        let Some((media_type, mal_id)) = entry(ctx) else {
            return Ok(());
        };

        let resolved = self
            .resolver
            .resolve_id(&mal_id, IdKind::Mal, IdKind::AniList, &media_type)
            .await?;
        if let Some(anilist_id) = resolved {
            self.overlay.insert(
                LINK_ELEMENT,
                Element::link("AniList", entry_url(&self.primary_host, &media_type, anilist_id)),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::page;
    use alextras_core::AppResult;
    use alextras_core::types::MediaContext;
    use alextras_module::GenerationToken;

    #[derive(Debug)]
    struct PlusOne;

    #[async_trait]
    impl MediaResolver for PlusOne {
        async fn resolve_id(
            &self,
            from_id: &str,
            from: IdKind,
            to: IdKind,
            entity_type: &str,
        ) -> AppResult<Option<u64>> {
            assert_eq!((from, to), (IdKind::Mal, IdKind::AniList));
            assert!(entity_type == "anime" || entity_type == "manga");
            Ok(from_id.parse::<u64>().ok().filter(|id| *id != 404).map(|id| id + 1))
        }
    }

    fn context(href: &str) -> NavigationContext {
        NavigationContext::new(page(href), None, MediaContext::default(), GenerationToken::detached())
    }

    fn module(overlay: Arc<PageOverlay>) -> AddAniListLink {
        AddAniListLink::new(overlay, Arc::new(PlusOne), &SiteConfig::default())
    }

    #[tokio::test]
    async fn test_links_entry_pages() {
        for href in [
            "https://myanimelist.net/anime/21/One_Piece",
            "https://myanimelist.net/anime.php?id=21",
        ] {
            let overlay = Arc::new(PageOverlay::new());
            let module = module(overlay.clone());
            let ctx = context(href);

            assert!(module.validate(&ctx).await.unwrap(), "{href}");
            module.load(&ctx).await.unwrap();
            assert_eq!(
                overlay.get(LINK_ELEMENT).unwrap().href.as_deref(),
                Some("https://anilist.co/anime/22/")
            );
        }
    }

    #[tokio::test]
    async fn test_skips_unmatched_entries() {
        let overlay = Arc::new(PageOverlay::new());
        let module = module(overlay.clone());

        module.load(&context("https://myanimelist.net/manga/404")).await.unwrap();
        assert!(overlay.is_empty());
        assert!(!module.validate(&context("https://myanimelist.net/people/1")).await.unwrap());
    }
}
