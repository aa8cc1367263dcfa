//! Cached cross-reference resolution between the two catalogs.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use alextras_cache::keys::{ID_MATCH_TTL, ID_MISS_TTL, ids_map_key, ids_map_store};
use alextras_core::traits::{ExpiringCache, MediaResolver};
use alextras_core::types::{IdKind, MediaType};
use alextras_core::{AppError, AppResult};

use crate::anilist::AniListApi;

/// [`MediaResolver`] backed by the primary site's GraphQL API.
///
/// Matches are cached for a week. Entries without a counterpart are
/// cached as `null` for a day so they are not looked up on every visit.
#[derive(Debug, Clone)]
pub struct IdResolver {
    api: AniListApi,
    cache: Arc<dyn ExpiringCache>,
}

impl IdResolver {
    pub fn new(api: AniListApi, cache: Arc<dyn ExpiringCache>) -> Self {
        Self { api, cache }
    }
}

#[async_trait]
impl MediaResolver for IdResolver {
    #[instrument(skip(self), fields(from = %from, to = %to))]
    async fn resolve_id(
        &self,
        from_id: &str,
        from: IdKind,
        to: IdKind,
        entity_type: &str,
    ) -> AppResult<Option<u64>> {
        let media_type: MediaType = entity_type.parse()?;
        let from_id = from_id.trim();
        if from_id.is_empty() {
            return Err(AppError::validation("Missing id"));
        }
        let id: u64 = from_id
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid id '{from_id}'")))?;

        if from == to {
            return Ok(Some(id));
        }

        let store = ids_map_store(media_type);
        let key = ids_map_key(from, to, id);

        if let Some(cached) = self.cache.get(&store, &key).await? {
            debug!(key, "Id mapping served from cache");
            return Ok(cached.as_u64());
        }

        let resolved = self.api.media_id(id, from, to, media_type).await?;
        match resolved {
            Some(found) => {
                self.cache
                    .set(&store, &key, Value::from(found), ID_MATCH_TTL)
                    .await?
            }
            None => self.cache.set(&store, &key, Value::Null, ID_MISS_TTL).await?,
        }

        Ok(resolved)
    }
}
