//! Contexts handed to module callbacks.

use alextras_core::types::{MediaContext, PageUrl};

use crate::generation::GenerationToken;

/// Everything a module learns about one navigation.
///
/// Built once per navigation and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct NavigationContext {
    /// The page navigated to.
    pub current_page: PageUrl,
    /// The page navigated from, if any.
    pub previous_page: Option<PageUrl>,
    /// Identifiers shared by all modules of the cycle.
    pub media: MediaContext,
    /// Generation of the navigation.
    pub token: GenerationToken,
}

impl NavigationContext {
    /// Create a context.
    pub fn new(
        current_page: PageUrl,
        previous_page: Option<PageUrl>,
        media: MediaContext,
        token: GenerationToken,
    ) -> Self {
        Self {
            current_page,
            previous_page,
            media,
            token,
        }
    }

    /// Whether this navigation has not been superseded.
    pub fn is_current(&self) -> bool {
        self.token.is_current()
    }

    /// The teardown view of this navigation.
    pub fn unload_context(&self) -> UnloadContext {
        UnloadContext {
            current_page: self.current_page.clone(),
            previous_page: self.previous_page.clone(),
        }
    }
}

/// What `validate_unload` and `unload` are told about a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnloadContext {
    /// The page navigated to.
    pub current_page: PageUrl,
    /// The page navigated from, if any.
    pub previous_page: Option<PageUrl>,
}
