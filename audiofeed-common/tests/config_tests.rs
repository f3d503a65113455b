//! Configuration resolution tests
//!
//! Tests that change XDG_CONFIG_HOME are marked #[serial] so they do not race
//! with each other.

use audiofeed_common::config::{ConfigOverrides, ServiceConfig, DEFAULT_PORT};
use audiofeed_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_explicit_config_file_used() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        root_folder = "/srv/audiofeed"
        port = 5600
        "#,
    )
    .unwrap();

    let config = ServiceConfig::resolve(ConfigOverrides {
        config_file: Some(path.clone()),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(config.root_folder, PathBuf::from("/srv/audiofeed"));
    assert_eq!(config.port, 5600);
    assert_eq!(config.config_file, Some(path));
    assert_eq!(config.database_path(), PathBuf::from("/srv/audiofeed/audiofeed.db"));
}

#[test]
fn test_explicit_config_file_missing_is_error() {
    let result = ServiceConfig::resolve(ConfigOverrides {
        config_file: Some(PathBuf::from("/nonexistent/audiofeed/config.toml")),
        ..Default::default()
    });

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
#[cfg(target_os = "linux")]
fn test_user_config_file_discovered() {
    let dir = TempDir::new().unwrap();
    let app_dir = dir.path().join("audiofeed");
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(app_dir.join("config.toml"), "frontend_url = \"https://feed.example\"\n").unwrap();

    let previous = env::var("XDG_CONFIG_HOME").ok();
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let config = ServiceConfig::resolve(ConfigOverrides::default());

    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    let config = config.unwrap();
    assert_eq!(config.frontend_url, "https://feed.example");
    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
#[serial]
#[cfg(target_os = "linux")]
fn test_missing_config_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();

    let previous = env::var("XDG_CONFIG_HOME").ok();
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let config = ServiceConfig::resolve(ConfigOverrides {
        port: Some(8080),
        ..Default::default()
    });

    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    let config = config.unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.bind_address, "127.0.0.1");
}
