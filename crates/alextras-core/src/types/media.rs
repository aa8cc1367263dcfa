//! Media entries shared between the two remote catalogs.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::page::PageUrl;

static MEDIA_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(anime|manga)/(\d+)").expect("static regex"));

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// An anime series or film.
    Anime,
    /// A manga or light novel.
    Manga,
}

impl MediaType {
    /// Lowercase path segment, e.g. `anime`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
        }
    }

    /// GraphQL `MediaType` enum value, e.g. `ANIME`.
    pub fn as_graphql(&self) -> &'static str {
        match self {
            Self::Anime => "ANIME",
            Self::Manga => "MANGA",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anime" => Ok(Self::Anime),
            "manga" => Ok(Self::Manga),
            other => Err(AppError::validation(format!(
                "Invalid media type '{other}'. Expected anime|manga"
            ))),
        }
    }
}

/// Which remote system an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    /// Identifier on the primary site.
    AniList,
    /// Identifier on the secondary site.
    Mal,
}

impl IdKind {
    /// Name of the matching field on the primary API's `Media` type.
    pub fn graphql_field(&self) -> &'static str {
        match self {
            Self::AniList => "id",
            Self::Mal => "idMal",
        }
    }

    /// Short name used in cache keys and the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AniList => "anilist",
            Self::Mal => "mal",
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anilist" | "id" => Ok(Self::AniList),
            "mal" | "myanimelist" | "idmal" => Ok(Self::Mal),
            other => Err(AppError::validation(format!(
                "Invalid id kind '{other}'. Expected anilist|mal"
            ))),
        }
    }
}

/// Media identifiers computed once per navigation and shared by every module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaContext {
    /// Entry type parsed from the path.
    pub media_type: Option<MediaType>,
    /// Primary-site id parsed from the path.
    pub id: Option<u64>,
    /// Secondary-site id resolved through the resolver, if any.
    pub mal_id: Option<u64>,
}

impl MediaContext {
    /// Parse entry type and id from a primary-site page. `mal_id` is left empty.
    pub fn from_page(page: &PageUrl) -> Self {
        let Some(caps) = MEDIA_PATH.captures(page.path()) else {
            return Self::default();
        };

        Self {
            media_type: caps.get(1).and_then(|m| m.as_str().parse().ok()),
            id: caps.get(2).and_then(|m| m.as_str().parse().ok()),
            mal_id: None,
        }
    }

    /// Both the entry type and id are known.
    pub fn is_entry(&self) -> bool {
        self.media_type.is_some() && self.id.is_some()
    }

    /// The `type/id` prefix of an entry path, e.g. `anime/21` for `/anime/21/characters`.
    pub fn entry_path(page: &PageUrl) -> Option<String> {
        MEDIA_PATH
            .captures(page.path())
            .and_then(|caps| caps.get(0))
            .map(|m| m.as_str().trim_start_matches('/').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(href: &str) -> PageUrl {
        PageUrl::parse(href).unwrap()
    }

    #[test]
    fn test_from_entry_page() {
        let media = MediaContext::from_page(&page("https://anilist.co/anime/21/One-Piece"));
        assert_eq!(media.media_type, Some(MediaType::Anime));
        assert_eq!(media.id, Some(21));
        assert_eq!(media.mal_id, None);
        assert!(media.is_entry());
    }

    #[test]
    fn test_from_non_entry_page() {
        let media = MediaContext::from_page(&page("https://anilist.co/user/someone/social"));
        assert_eq!(media, MediaContext::default());
        assert!(!media.is_entry());
    }

    #[test]
    fn test_entry_path_ignores_subpages() {
        assert_eq!(
            MediaContext::entry_path(&page("https://anilist.co/manga/30013/characters")),
            Some("manga/30013".to_string())
        );
        assert_eq!(MediaContext::entry_path(&page("https://anilist.co/home")), None);
    }

    #[test]
    fn test_parse_media_type() {
        assert_eq!("ANIME".parse::<MediaType>().unwrap(), MediaType::Anime);
        assert!("novel".parse::<MediaType>().is_err());
    }
}
