//! Normalized page locations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AppError;

/// A page location with its fragment stripped.
///
/// Two locations that differ only by `#fragment` compare equal, so
/// in-page anchor jumps never count as navigations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageUrl(Url);

impl PageUrl {
    /// Parse and normalize an absolute location.
    pub fn parse(href: &str) -> Result<Self, AppError> {
        let mut url = Url::parse(href.trim())?;
        url.set_fragment(None);
        Ok(Self(url))
    }

    /// The full normalized location.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The path component, e.g. `/anime/21/characters`.
    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// The host name, if any.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// The underlying URL.
    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageUrl {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PageUrl {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PageUrl> for String {
    fn from(value: PageUrl) -> Self {
        value.0.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_is_stripped() {
        let a = PageUrl::parse("https://anilist.co/anime/21#reviews").unwrap();
        let b = PageUrl::parse("https://anilist.co/anime/21").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://anilist.co/anime/21");
    }

    #[test]
    fn test_query_is_kept() {
        let a = PageUrl::parse("https://anilist.co/search/anime?season=WINTER").unwrap();
        let b = PageUrl::parse("https://anilist.co/search/anime?season=SPRING").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_relative_location_rejected() {
        assert!(PageUrl::parse("/anime/21").is_err());
    }
}
