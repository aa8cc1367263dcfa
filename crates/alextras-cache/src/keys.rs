//! Cache store names, key builders and lifetimes for every cached lookup.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use std::time::Duration;

use alextras_core::types::{IdKind, MediaType};

/// One minute.
pub const ONE_MINUTE: Duration = Duration::from_secs(60);
/// One hour.
pub const ONE_HOUR: Duration = Duration::from_secs(60 * 60);
/// One day.
pub const ONE_DAY: Duration = Duration::from_secs(60 * 60 * 24);
/// One week.
pub const ONE_WEEK: Duration = Duration::from_secs(60 * 60 * 24 * 7);

// ── Cross-reference ids ────────────────────────────────────

/// Store holding id mappings for one media type.
pub fn ids_map_store(media_type: MediaType) -> String {
    format!("ids-map-{}", media_type.as_graphql())
}

/// Key of a single id mapping.
pub fn ids_map_key(from: IdKind, to: IdKind, from_id: u64) -> String {
    format!("{}-{}-{from_id}", from.graphql_field(), to.graphql_field())
}

/// How long a resolved mapping is trusted.
pub const ID_MATCH_TTL: Duration = ONE_WEEK;

/// How long a missing mapping is trusted; catalogs gain links over time.
pub const ID_MISS_TTL: Duration = ONE_DAY;

// ── Users ──────────────────────────────────────────────────

/// Store mapping usernames to user ids.
pub const USER_IDS_STORE: &str = "userids-map";

/// Key of a username mapping.
pub fn user_id_key(username: &str) -> String {
    username.to_lowercase()
}

/// How long a username mapping is trusted.
pub const USER_ID_TTL: Duration = ONE_HOUR;

// ── Secondary API responses ────────────────────────────────

/// Store holding raw responses of the secondary-site REST API.
pub const MAL_API_STORE: &str = "mal-api-response";

/// Default lifetime of a cached REST response.
pub const MAL_API_TTL: Duration = ONE_HOUR;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_map_names() {
        assert_eq!(ids_map_store(MediaType::Anime), "ids-map-ANIME");
        assert_eq!(ids_map_key(IdKind::AniList, IdKind::Mal, 21), "id-idMal-21");
        assert_eq!(ids_map_key(IdKind::Mal, IdKind::AniList, 21), "idMal-id-21");
    }

    #[test]
    fn test_user_key_is_lowercase() {
        assert_eq!(user_id_key("SomeUser"), "someuser");
    }
}
