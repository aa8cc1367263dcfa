//! Feature modules shipped with the binary.
//!
//! Each module records its effect in the [`PageOverlay`](crate::page::PageOverlay)
//! instead of a document.

pub mod add_anilist_link;
pub mod add_mal_link;
pub mod add_mal_score;
pub mod hide_global_feed;

use std::sync::Arc;

use alextras_core::types::MediaContext;
#[cfg(test)]
use alextras_core::types::PageUrl;
use alextras_module::{PageModule, UnloadContext};

use crate::app::App;

pub use add_anilist_link::AddAniListLink;
pub use add_mal_link::AddMalLink;
pub use add_mal_score::AddMalScore;
pub use hide_global_feed::HideGlobalFeed;

/// Modules of the primary site, in registration order.
pub fn primary_modules(app: &App) -> Vec<Arc<dyn PageModule>> {
    vec![
        Arc::new(AddMalLink::new(app.overlay.clone(), &app.config.site)),
        Arc::new(AddMalScore::new(
            app.overlay.clone(),
            app.jikan.clone(),
            app.store.clone(),
            &app.config.site,
        )),
        Arc::new(HideGlobalFeed::new(app.overlay.clone(), &app.config.loader)),
    ]
}

/// Modules of the secondary site, in registration order.
pub fn secondary_modules(app: &App) -> Vec<Arc<dyn PageModule>> {
    vec![Arc::new(AddAniListLink::new(
        app.overlay.clone(),
        app.resolver.clone(),
        &app.config.site,
    ))]
}

/// Whether a navigation left the entry (`type/id`) the module was loaded for.
pub(crate) fn entry_changed(ctx: &UnloadContext) -> bool {
    let previous = ctx.previous_page.as_ref().and_then(MediaContext::entry_path);
    MediaContext::entry_path(&ctx.current_page) != previous
}

/// Entry URL on a site, e.g. `https://myanimelist.net/anime/21/`.
pub(crate) fn entry_url(host: &str, media_type: &str, id: u64) -> String {
    format!("https://{host}/{media_type}/{id}/")
}

#[cfg(test)]
pub(crate) fn page(href: &str) -> PageUrl {
    PageUrl::parse(href).unwrap()
}
