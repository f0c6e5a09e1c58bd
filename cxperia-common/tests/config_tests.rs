//! Tests for configuration loading and data folder resolution
//!
//! Tests touching CXPERIA_* environment variables are marked #[serial] so
//! they never race each other.

use cxperia_common::config::{resolve_data_folder, ServerConfig, DATA_FOLDER_ENV};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(DATA_FOLDER_ENV, "/tmp/from-env");
    let config = ServerConfig {
        data_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..ServerConfig::default()
    };

    let folder = resolve_data_folder(Some(Path::new("/tmp/from-cli")), &config);
    assert_eq!(folder, PathBuf::from("/tmp/from-cli"));

    env::remove_var(DATA_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(DATA_FOLDER_ENV, "/tmp/from-env");
    let config = ServerConfig {
        data_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..ServerConfig::default()
    };

    assert_eq!(resolve_data_folder(None, &config), PathBuf::from("/tmp/from-env"));

    env::remove_var(DATA_FOLDER_ENV);
}

#[test]
#[serial]
fn test_toml_beats_default() {
    env::remove_var(DATA_FOLDER_ENV);
    let config = ServerConfig {
        data_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..ServerConfig::default()
    };

    assert_eq!(resolve_data_folder(None, &config), PathBuf::from("/tmp/from-toml"));
}

#[test]
#[serial]
fn test_default_folder_is_non_empty() {
    env::remove_var(DATA_FOLDER_ENV);
    let folder = resolve_data_folder(None, &ServerConfig::default());
    assert!(!folder.as_os_str().is_empty());
    assert!(folder.to_string_lossy().contains("cxperia"));
}

#[test]
fn test_load_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        bind_addr = "0.0.0.0:8080"
        scan_dedup_minutes = 5
        "#,
    )
    .unwrap();

    let config = ServerConfig::load(Some(&path));
    assert_eq!(config.bind_addr, "0.0.0.0:8080");
    assert_eq!(config.scan_dedup_minutes, 5);
    assert_eq!(config.session_ttl_hours, 168);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let config = ServerConfig::load(Some(Path::new("/nonexistent/cxperia/config.toml")));
    assert_eq!(config, ServerConfig::default());
}

#[test]
fn test_malformed_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "bind_addr = [").unwrap();

    assert_eq!(ServerConfig::load(Some(&path)), ServerConfig::default());
}
