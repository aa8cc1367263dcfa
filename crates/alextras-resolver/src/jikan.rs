//! REST client for the secondary site's public mirror API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

use alextras_cache::keys::MAL_API_STORE;
use alextras_core::traits::ExpiringCache;
use alextras_core::types::MediaType;
use alextras_core::{AppError, AppResult};

use crate::client::ApiClient;

/// Summary of a secondary-site entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MalEntry {
    /// Secondary-site id.
    pub mal_id: u64,
    /// Canonical entry URL.
    pub url: Option<String>,
    /// Weighted mean score, absent for unrated entries.
    pub score: Option<f64>,
    /// Number of users who rated the entry.
    pub scored_by: Option<u64>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Secondary-site REST API. Responses are cached per path.
#[derive(Debug, Clone)]
pub struct JikanApi {
    client: ApiClient,
    base_url: String,
    cache: Arc<dyn ExpiringCache>,
}

impl JikanApi {
    /// Create an API handle on the configured base URL.
    pub fn new(client: ApiClient, cache: Arc<dyn ExpiringCache>) -> Self {
        let base_url = client.config().jikan_url.trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            cache,
        }
    }

    /// Fetch `path` (e.g. `anime/21`), serving and storing cached bodies
    /// for `cache_ttl`. `None` bypasses the cache entirely.
    #[instrument(skip(self))]
    pub async fn get(&self, path: &str, cache_ttl: Option<Duration>) -> AppResult<Value> {
        let path = path.trim_start_matches('/');

        if cache_ttl.is_some() {
            if let Some(cached) = self.cache.get(MAL_API_STORE, path).await? {
                debug!(path, "Serving cached response");
                return Ok(cached);
            }
        }

        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .execute("jikan", self.client.http().get(&url))
            .await?;

        if response.status != StatusCode::OK {
            return Err(AppError::external_service(format!(
                "Failed to fetch {path}: {}",
                response.status
            )));
        }
        if let Some(message) = response.body.get("error").filter(|e| !e.is_null()) {
            error!(path, body = %response.body, "API reported an error");
            let message = message
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| message.to_string());
            return Err(AppError::external_service(message));
        }

        if let Some(ttl) = cache_ttl {
            self.cache
                .set(MAL_API_STORE, path, response.body.clone(), ttl)
                .await?;
        }

        Ok(response.body)
    }

    /// Fetch the summary of one entry.
    pub async fn entry(
        &self,
        media_type: MediaType,
        mal_id: u64,
        cache_ttl: Option<Duration>,
    ) -> AppResult<MalEntry> {
        let body = self
            .get(&format!("{}/{mal_id}", media_type.as_str()), cache_ttl)
            .await?;
        let envelope: Envelope<MalEntry> = serde_json::from_value(body)?;
        Ok(envelope.data)
    }
}
