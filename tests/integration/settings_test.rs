//! Settings, backup and module management through the wired application.

mod helpers;

use serde_json::json;

use alextras::modules::{add_anilist_link, add_mal_link, add_mal_score, hide_global_feed};
use alextras_core::error::ErrorKind;
use alextras_core::types::SiteSurface;
use alextras_store::{backup, keys};

use helpers::TestApp;

#[tokio::test]
async fn test_module_ids_span_both_sites() {
    let t = TestApp::new().await;
    assert_eq!(
        t.app.module_ids(),
        [
            add_mal_link::ID,
            add_mal_score::ID,
            hide_global_feed::ID,
            add_anilist_link::ID
        ]
    );
    assert_eq!(
        t.app.registry_of(add_anilist_link::ID).unwrap().surface(),
        SiteSurface::Secondary
    );

    let err = t.app.registry_of("noSuchModule").err().unwrap();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_settings_are_validated_and_defaulted() {
    let t = TestApp::new().await;
    let settings = t
        .app
        .registry_of(add_mal_score::ID)
        .unwrap()
        .settings(add_mal_score::ID)
        .unwrap();

    assert_eq!(settings.get("showVotes", None), Some(json!(false)));
    let err = settings.set("showVotes", json!("yes")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    settings.set("showVotes", json!(true)).await.unwrap();
    assert_eq!(settings.get_typed::<bool>("showVotes"), Some(true));
}

#[tokio::test]
async fn test_backup_roundtrip_keeps_token_local() {
    let t = TestApp::new().await;
    let store = &t.app.store;
    store.set(keys::API_TOKEN, json!("secret")).await.unwrap();
    t.app
        .registry(SiteSurface::Primary)
        .enable(hide_global_feed::ID)
        .await
        .unwrap();
    store
        .update_object(keys::SETTINGS, |map| {
            map.insert("removedModule".to_string(), json!({ "x": 1 }));
        })
        .await
        .unwrap();

    let ids = t.app.module_ids();
    let exported = backup::export(store, ids.iter().map(String::as_str), "test")
        .await
        .unwrap();
    assert!(exported.get(keys::API_TOKEN).is_none());
    assert!(exported[keys::SETTINGS].get("removedModule").is_none());
    assert_eq!(exported[keys::MODULE_STATES][hide_global_feed::ID], json!(true));

    store.clear().await.unwrap();
    store.set(keys::API_TOKEN, json!("newer")).await.unwrap();
    backup::import(store, exported).await.unwrap();

    assert_eq!(store.get(keys::API_TOKEN), Some(json!("newer")));
    assert!(store.get(keys::BACKUP_META).is_none());
    assert_eq!(
        t.app.registry(SiteSurface::Primary).is_enabled(hide_global_feed::ID),
        Some(true)
    );
}

#[tokio::test]
async fn test_verbose_logging_toggle() {
    let t = TestApp::new().await;
    assert!(!t.app.verbose_logging());
    t.app
        .store
        .set(keys::VERBOSE_LOGGING, json!(true))
        .await
        .unwrap();
    assert!(t.app.verbose_logging());
}

#[tokio::test]
async fn test_file_backed_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = alextras_core::config::AppConfig::default();
    config.store.directory = dir.path().join("store").to_string_lossy().into_owned();
    config.cache.provider = "disk".to_string();
    config.cache.directory = dir.path().join("cache").to_string_lossy().into_owned();

    let app = alextras::App::build(config.clone()).await.unwrap();
    app.registry(SiteSurface::Primary)
        .disable(add_mal_score::ID)
        .await
        .unwrap();
    drop(app);

    let app = alextras::App::build(config).await.unwrap();
    assert_eq!(
        app.registry(SiteSurface::Primary).is_enabled(add_mal_score::ID),
        Some(false)
    );
    assert!(dir.path().join("store").join("anilist-extras.json").exists());
}
