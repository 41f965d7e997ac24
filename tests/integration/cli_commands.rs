//! Integration tests for CLI command routing that needs no registry

use drui::cli::{Commands, RunContext, ThemeCommands, BROADCAST_NOT_FOUND};
use drui::config::{ConfigLoader, DruiConfig};
use drui::error::DruiError;
use drui::modal::recording::RecordingSurface;
use drui::store::{FileStore, KeyValueStore};
use drui::theme::{Theme, ThemeManager, THEME_KEY};
use std::sync::Arc;
use tempfile::TempDir;

fn context_with_store(config: DruiConfig, store: Arc<dyn KeyValueStore>) -> RunContext {
    let theme = ThemeManager::new(store).unwrap();
    RunContext::with_parts(config, theme, Arc::new(RecordingSurface::new())).unwrap()
}

#[tokio::test]
async fn test_theme_toggle_persists_to_file_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("state.toml");
    let store = Arc::new(FileStore::open(&path).unwrap());
    store.set(THEME_KEY, "light").unwrap();

    let ctx = context_with_store(DruiConfig::default(), store);
    let out = ctx
        .execute(&Commands::Theme {
            command: Some(ThemeCommands::Toggle),
        })
        .await
        .unwrap();
    assert_eq!(out, "Theme switched to dark.");

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    let manager = ThemeManager::new(Arc::new(reopened)).unwrap();
    assert_eq!(manager.current(), Theme::Dark);
}

#[tokio::test]
async fn test_broadcast_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let broadcast = temp_dir.path().join("broadcast.txt");
    std::fs::write(&broadcast, "Registry migration\nPushes are paused on Friday.").unwrap();
    let config_path = temp_dir.path().join("drui.toml");
    std::fs::write(
        &config_path,
        format!("[broadcast]\npath = {:?}\n", broadcast.to_string_lossy()),
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_path).unwrap();
    let ctx = context_with_store(config, Arc::new(drui::store::MemoryStore::new()));
    let out = ctx
        .execute(&Commands::Broadcast {
            format: "text".to_string(),
        })
        .await
        .unwrap();

    assert!(out.contains("Registry migration"));
    assert!(out.ends_with("Pushes are paused on Friday."));
}

#[tokio::test]
async fn test_missing_broadcast_is_reported() {
    let ctx = context_with_store(DruiConfig::default(), Arc::new(drui::store::MemoryStore::new()));
    let out = ctx
        .execute(&Commands::Broadcast {
            format: "text".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(out, BROADCAST_NOT_FOUND);
}

#[tokio::test]
async fn test_login_without_endpoint_is_config_error() {
    let ctx = context_with_store(DruiConfig::default(), Arc::new(drui::store::MemoryStore::new()));
    let result = ctx.execute(&Commands::Login).await;
    assert!(matches!(result, Err(DruiError::Config(_))));
}
