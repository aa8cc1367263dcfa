//! End-to-end lifecycle tests of the shipped modules.

mod helpers;

use alextras::modules::{add_anilist_link, add_mal_link, add_mal_score, hide_global_feed};
use alextras_core::types::SiteSurface;
use alextras_module::{ChannelNavigationSource, ModuleOutcome, NavigationWatcher};
use tokio_util::sync::CancellationToken;

use helpers::{TestApp, page};

#[tokio::test]
async fn test_entry_page_loads_link_and_score() {
    let t = TestApp::new().await;
    t.mock_mal_id(101, Some(5101)).await;
    t.mock_mal_entry("anime", 5101, 7.5).await;

    let orchestrator = t.app.orchestrator();
    let report = orchestrator
        .navigate(page("https://anilist.co/anime/101/Title"), None)
        .await;

    assert_eq!(report.outcome(add_mal_link::ID), Some(ModuleOutcome::Loaded));
    assert_eq!(report.outcome(add_mal_score::ID), Some(ModuleOutcome::Loaded));
    assert_eq!(report.outcome(hide_global_feed::ID), Some(ModuleOutcome::Disabled));

    let link = t.app.overlay.get(add_mal_link::LINK_ELEMENT).unwrap();
    assert_eq!(link.href.as_deref(), Some("https://myanimelist.net/anime/5101/"));
    let score = t.app.overlay.get(add_mal_score::SCORE_ELEMENT).unwrap();
    assert_eq!(score.text, "MAL Score: 7.50");
}

#[tokio::test]
async fn test_subpage_retains_and_home_unloads() {
    let t = TestApp::new().await;
    t.mock_mal_id(102, Some(5102)).await;
    t.mock_mal_entry("anime", 5102, 8.0).await;

    let orchestrator = t.app.orchestrator();
    let entry = page("https://anilist.co/anime/102/Title");
    orchestrator.navigate(entry.clone(), None).await;

    let characters = page("https://anilist.co/anime/102/Title/characters");
    let report = orchestrator
        .navigate(characters.clone(), Some(entry))
        .await;
    assert_eq!(report.outcome(add_mal_link::ID), Some(ModuleOutcome::Retained));
    assert_eq!(report.outcome(add_mal_score::ID), Some(ModuleOutcome::Retained));
    assert!(t.app.overlay.contains(add_mal_link::LINK_ELEMENT));

    let report = orchestrator
        .navigate(page("https://anilist.co/home"), Some(characters))
        .await;
    assert_eq!(report.outcome(add_mal_link::ID), Some(ModuleOutcome::NotApplicable));
    assert!(t.app.overlay.is_empty());
    assert!(orchestrator.registry().active().is_empty());
}

#[tokio::test]
async fn test_entry_without_counterpart() {
    let t = TestApp::new().await;
    t.mock_mal_id(103, None).await;

    let report = t
        .app
        .orchestrator()
        .navigate(page("https://anilist.co/manga/103"), None)
        .await;

    assert_eq!(report.outcome(add_mal_link::ID), Some(ModuleOutcome::Loaded));
    assert!(t.app.overlay.is_empty());
}

#[tokio::test]
async fn test_enabled_style_module_on_home() {
    let t = TestApp::new().await;
    let orchestrator = t.app.orchestrator();
    orchestrator
        .registry()
        .enable(hide_global_feed::ID)
        .await
        .unwrap();
    assert_eq!(t.app.styles.keys().len(), 1);

    let report = orchestrator.navigate(page("https://anilist.co/home"), None).await;
    assert_eq!(report.outcome(hide_global_feed::ID), Some(ModuleOutcome::Loaded));
    assert!(orchestrator.registry().active().contains(hide_global_feed::ID));

    // The enabled flag survives a fresh registry.
    let registry = t.app.registry(SiteSurface::Primary);
    assert_eq!(registry.is_enabled(hide_global_feed::ID), Some(true));
}

#[tokio::test]
async fn test_watcher_follows_stdin_style_source() {
    let t = TestApp::new().await;
    t.mock_mal_id(104, Some(5104)).await;
    t.mock_mal_entry("anime", 5104, 6.0).await;

    let watcher = NavigationWatcher::new(t.app.orchestrator());
    let (locations, source) = ChannelNavigationSource::channel(8);
    for href in [
        "https://anilist.co/anime/104",
        "https://anilist.co/anime/104#reviews",
    ] {
        locations.send(href.to_string()).await.unwrap();
    }
    drop(locations);

    watcher.run(source, CancellationToken::new()).await;
    watcher.drain().await;

    assert_eq!(
        watcher.current_page().map(|p| p.to_string()),
        Some("https://anilist.co/anime/104".to_string())
    );
    assert!(t.app.overlay.contains(add_mal_link::LINK_ELEMENT));
}

#[tokio::test]
async fn test_secondary_page_links_back() {
    let t = TestApp::new().await;
    t.mock_anilist_id(5105, 105).await;

    let report = t
        .app
        .secondary_loader()
        .run_once(page("https://myanimelist.net/anime/5105/Title"))
        .await;

    assert_eq!(report.generation, 0);
    assert_eq!(report.outcome(add_anilist_link::ID), Some(ModuleOutcome::Loaded));
    let link = t.app.overlay.get(add_anilist_link::LINK_ELEMENT).unwrap();
    assert_eq!(link.href.as_deref(), Some("https://anilist.co/anime/105/"));
}
