//! Secondary-site score of a primary-site entry.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use alextras_cache::keys::MAL_API_TTL;
use alextras_core::config::site::SiteConfig;
use alextras_core::types::{SettingDescriptor, SettingsSchema};
use alextras_module::{ModuleDescriptor, ModuleTag, NavigationContext, PageModule, UnloadContext};
use alextras_resolver::JikanApi;
use alextras_store::{SettingsManager, Store};

use crate::page::{Element, PageOverlay};

use super::{add_mal_link, entry_changed, entry_url};

pub const ID: &str = "addMalScore";

/// Overlay element holding the score.
pub const SCORE_ELEMENT: &str = "alextras--mal-score";

const SHOW_VOTES: &str = "showVotes";

pub struct AddMalScore {
    overlay: Arc<PageOverlay>,
    jikan: JikanApi,
    settings: SettingsManager,
    secondary_host: String,
}

impl AddMalScore {
    pub fn new(overlay: Arc<PageOverlay>, jikan: JikanApi, store: Arc<Store>, sites: &SiteConfig) -> Self {
        Self {
            overlay,
            jikan,
            settings: SettingsManager::new(ID, schema(), store),
            secondary_host: sites.secondary_host.clone(),
        }
    }
}

fn schema() -> SettingsSchema {
    SettingsSchema::new().with(
        SHOW_VOTES,
        SettingDescriptor::toggle("Show vote count", false)
            .with_description("Append the number of users who rated the entry."),
    )
}

#[async_trait]
impl PageModule for AddMalScore {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor::new(ID, "MyAnimeList Score")
            .description("Adds the MyAnimeList score to the sidebar on anime/manga pages.")
            .tags(&[ModuleTag::Media, ModuleTag::Scores])
            .settings(schema())
            .depends_on(&[add_mal_link::ID])
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

        let entry = self.jikan.entry(media_type, mal_id, Some(MAL_API_TTL)).await?;
        if !ctx.is_current() {
            debug!(module_id = ID, "Navigation superseded, dropping score");
            return Ok(());
        }

        let score = entry
            .score
            .map(|s| format!("{s:.2}"))
            .unwrap_or_else(|| "N/A".to_string());
        let mut text = format!("MAL Score: {score}");
        if self.settings.get_typed::<bool>(SHOW_VOTES).unwrap_or(false) {
            if let Some(votes) = entry.scored_by {
                text.push_str(&format!(" ({votes} votes)"));
            }
        }

        self.overlay.insert(
            SCORE_ELEMENT,
            Element::link(text, entry_url(&self.secondary_host, media_type.as_str(), mal_id)),
        );
        Ok(())
    }

    fn has_unload(&self) -> bool {
        true
    }

    async fn unload(&self, _ctx: &UnloadContext) -> anyhow::Result<()> {
        self.overlay.remove(SCORE_ELEMENT);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::page;
    use alextras_cache::memory::MemoryCacheProvider;
    use alextras_core::config::api::ApiConfig;
    use alextras_core::traits::ExpiringCache;
    use alextras_core::types::MediaContext;
    use alextras_module::GenerationToken;
    use alextras_resolver::ApiClient;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn module(server: &MockServer) -> (AddMalScore, Arc<PageOverlay>, Arc<Store>) {
        let config = ApiConfig {
            jikan_url: server.uri(),
            max_retries: 0,
            ..ApiConfig::default()
        };
        let cache: Arc<dyn ExpiringCache> = Arc::new(MemoryCacheProvider::new(100));
        let jikan = JikanApi::new(ApiClient::new(&config).unwrap(), cache);
        let overlay = Arc::new(PageOverlay::new());
        let store = Arc::new(Store::in_memory().await.unwrap());
        let module = AddMalScore::new(overlay.clone(), jikan, store.clone(), &SiteConfig::default());
        (module, overlay, store)
    }

    fn context(href: &str, mal_id: u64) -> NavigationContext {
        let current = page(href);
        let mut media = MediaContext::from_page(&current);
        media.mal_id = Some(mal_id);
        NavigationContext::new(current, None, media, GenerationToken::detached())
    }

    #[tokio::test]
    async fn test_load_shows_score() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/anime/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "mal_id": 1, "score": 8.75, "scored_by": 1000 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (module, overlay, _store) = module(&server).await;
        let ctx = context("https://anilist.co/anime/1/Cowboy-Bebop", 1);
        module.load(&ctx).await.unwrap();
        // Idempotent; second load is served from the cache.
        module.load(&ctx).await.unwrap();

        let score = overlay.get(SCORE_ELEMENT).unwrap();
        assert_eq!(score.text, "MAL Score: 8.75");
        assert_eq!(score.href.as_deref(), Some("https://myanimelist.net/anime/1/"));
    }

    #[tokio::test]
    async fn test_vote_count_setting() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manga/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "mal_id": 2, "score": null, "scored_by": 12 }
            })))
            .mount(&server)
            .await;

        let (module, overlay, _store) = module(&server).await;
        module.settings.set(SHOW_VOTES, json!(true)).await.unwrap();
        module.load(&context("https://anilist.co/manga/2", 2)).await.unwrap();

        assert_eq!(overlay.get(SCORE_ELEMENT).unwrap().text, "MAL Score: N/A (12 votes)");
    }

    #[tokio::test]
    async fn test_api_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (module, overlay, _store) = module(&server).await;
        assert!(module.load(&context("https://anilist.co/anime/3", 3)).await.is_err());
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_schema_defaults() {
        let schema = schema();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.get(SHOW_VOTES).and_then(|d| d.default_value()), Some(json!(false)));
    }
}
