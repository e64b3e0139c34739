//! Tests for config loading

use super::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_path_location() {
    let path = get_config_path();
    assert!(path.ends_with(".config/rainbow-brackets/config.toml"));
}

#[test]
fn test_missing_file_returns_defaults() {
    let dir = TempDir::new().unwrap();
    let result = load_config_from(&dir.path().join("config.toml"));
    assert_eq!(result.config, Config::default());
    assert!(result.warning.is_none());
}

#[test]
fn test_valid_file_is_loaded() {
    let file = write_config(
        r##"
window_size = 200

[default]
rainbow_colors = ["#111111", "#222222"]
"##,
    );
    let result = load_config_from(file.path());
    assert!(result.warning.is_none());
    assert_eq!(result.config.window_size, 200);
    assert_eq!(
        result.config.default.rainbow_colors,
        Some(vec!["#111111".to_string(), "#222222".to_string()])
    );
}

#[test]
fn test_empty_file_is_default() {
    let file = write_config("");
    let result = load_config_from(file.path());
    assert!(result.warning.is_none());
    assert_eq!(result.config, Config::default());
}

#[test]
fn test_malformed_toml_falls_back_with_warning() {
    let file = write_config("[default\ncoloring = true");
    let result = load_config_from(file.path());
    assert_eq!(result.config, Config::default());
    let warning = result.warning.unwrap();
    assert!(warning.starts_with("Invalid config:"), "{warning}");
}

#[test]
fn test_unknown_syntax_key_falls_back_with_warning() {
    let file = write_config("[syntax.rust]\nbracket_pair = {}\n");
    let result = load_config_from(file.path());
    assert_eq!(result.config, Config::default());
    assert!(result.warning.is_some());
}

#[test]
fn test_unreadable_path_falls_back_with_warning() {
    let dir = TempDir::new().unwrap();
    let result = load_config_from(dir.path());
    assert_eq!(result.config, Config::default());
    let warning = result.warning.unwrap();
    assert!(warning.starts_with("Failed to read config:"), "{warning}");
}
