//! Unit tests for configuration resolution and graceful degradation
//!
//! Covers:
//! - Missing TOML files fall back to compiled defaults
//! - Priority order: CLI path → VOT_CONFIG → platform config dir → defaults
//! - Partial TOML files keep defaults for omitted fields
//! - Malformed TOML is reported as a configuration error
//!
//! Note: Uses serial_test to prevent VOT_CONFIG race conditions between tests.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use vot_common::config::{
    load_toml_config, write_toml_config, ConfigResolver, TomlConfig, CONFIG_ENV_VAR,
};
use vot_common::Error;

#[test]
fn test_compiled_defaults() {
    let config = TomlConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.translation.retry_with_subtitles_ms, 20_000);
    assert_eq!(config.translation.retry_without_subtitles_ms, 30_000);
    assert_eq!(config.translation.cache_ttl_secs, 7_200);
    assert_eq!(config.translation.default_duration_secs, 343.0);
    assert!(config.api.fallback_proxy.is_none());
    assert!(config.playback.max_volume_boost > 1.0);
}

#[test]
#[serial]
fn test_cli_path_takes_precedence_over_env() {
    let dir = TempDir::new().unwrap();
    let cli_path = dir.path().join("cli.toml");
    env::set_var(CONFIG_ENV_VAR, "/tmp/vot-env-config.toml");

    let resolver = ConfigResolver::new(Some(cli_path.clone()));
    assert_eq!(resolver.resolve(), Some(cli_path));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_path() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/vot-env-config.toml");

    let resolver = ConfigResolver::new(None);
    assert_eq!(
        resolver.resolve(),
        Some(PathBuf::from("/tmp/vot-env-config.toml"))
    );

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let config = ConfigResolver::new(Some(missing)).load().unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[translation]
retry_with_subtitles_ms = 5000

[api]
host = "translate.example.org"
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.translation.retry_with_subtitles_ms, 5_000);
    assert_eq!(config.translation.retry_without_subtitles_ms, 30_000);
    assert_eq!(config.api.host, "translate.example.org");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[translation\nretry = ").unwrap();

    match load_toml_config(&path) {
        Err(Error::Config(msg)) => assert!(msg.contains("Parse")),
        other => panic!("Expected config error, got {:?}", other),
    }
}

#[test]
fn test_write_then_load_preserves_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = TomlConfig::default();
    config.playback.audio_proxy_host = Some("audio-proxy.example.org".to_string());
    config.logging.level = "debug".to_string();

    write_toml_config(&config, &path).unwrap();
    assert!(path.exists());
    assert!(!dir.path().join("nested").join("config.toml.tmp").exists());

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded, config);
}
