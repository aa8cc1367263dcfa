//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use alextras::App;
use alextras_core::config::AppConfig;
use alextras_core::types::PageUrl;
use alextras_store::Store;

/// Test application wired against a mock API server
pub struct TestApp {
    /// The wired application
    pub app: App,
    /// Mock server standing in for both remote APIs
    pub server: MockServer,
}

impl TestApp {
    /// Create a new test application with an in-memory store and cache
    pub async fn new() -> Self {
        let server = MockServer::start().await;

        let mut config = AppConfig::default();
        config.cache.provider = "memory".to_string();
        config.api.anilist_url = format!("{}/graphql", server.uri());
        config.api.jikan_url = format!("{}/v4", server.uri());
        config.api.max_retries = 0;
        config.loader.wait_timeout_ms = 50;
        config.loader.dependency_timeout_ms = 2_000;

        let store = Arc::new(Store::in_memory().await.expect("Failed to open store"));
        let app = App::with_store(config, store)
            .await
            .expect("Failed to wire application");

        Self { app, server }
    }

    /// Answer AniList→MAL lookups of `anilist_id` with `mal_id`
    pub async fn mock_mal_id(&self, anilist_id: u64, mal_id: Option<u64>) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("Media(id: $id"))
            .and(body_string_contains(format!("\"id\":{anilist_id}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "Media": { "idMal": mal_id } } })),
            )
            .mount(&self.server)
            .await;
    }

    /// Answer MAL→AniList lookups of `mal_id` with `anilist_id`
    pub async fn mock_anilist_id(&self, mal_id: u64, anilist_id: u64) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("idMal: $id"))
            .and(body_string_contains(format!("\"id\":{mal_id}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "Media": { "id": anilist_id } } })),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve a MAL entry with `score`
    pub async fn mock_mal_entry(&self, media_type: &str, mal_id: u64, score: f64) {
        Mock::given(method("GET"))
            .and(path(format!("/v4/{media_type}/{mal_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "mal_id": mal_id, "score": score, "scored_by": 10 }
            })))
            .mount(&self.server)
            .await;
    }
}

/// Parse a page URL
pub fn page(href: &str) -> PageUrl {
    PageUrl::parse(href).expect("valid URL")
}
