//! Configuration loading and config file resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `VOT_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/vot/config.toml`)
//! 4. Compiled defaults (fallback, no file)
//!
//! A missing config file is never fatal: a warning is logged and compiled
//! defaults are used. A config file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "VOT_CONFIG";

/// Application directory name under the platform config/data directories
pub const APP_DIR_NAME: &str = "vot";

/// Root of the TOML config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub translation: TranslationConfig,
    pub playback: PlaybackConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[api]` section: translation backend endpoint and request signing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend host (no scheme)
    pub host: String,
    /// Shared HMAC key used to sign request bodies
    pub hmac_key: String,
    /// User-Agent sent with every backend request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Optional proxy URL for the fallback transport
    pub fallback_proxy: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "api.browser.yandex.ru".to_string(),
            hmac_key: "bt8xH3VOlb4mqf0nqAibnDOoiPlXsisf".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/122.0.0.0 YaBrowser/24.4.0.0 Safari/537.36"
                .to_string(),
            timeout_secs: 30,
            fallback_proxy: None,
        }
    }
}

/// `[translation]` section: orchestrator timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Retry delay when backend subtitles already exist for the video
    pub retry_with_subtitles_ms: u64,
    /// Retry delay otherwise
    pub retry_without_subtitles_ms: u64,
    /// Lifetime of a cached translation
    pub cache_ttl_secs: u64,
    /// Duration sent for videos whose length is unknown
    pub default_duration_secs: f64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            retry_with_subtitles_ms: 20_000,
            retry_without_subtitles_ms: 30_000,
            cache_ttl_secs: 7_200,
            default_duration_secs: 343.0,
        }
    }
}

/// `[playback]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Host used to proxy translated audio when direct playback fails
    pub audio_proxy_host: Option<String>,
    /// Upper bound for gain-boosted volume (1.0 = 100%)
    pub max_volume_boost: f64,
    /// Original video volume while translated audio plays (0.0 - 1.0)
    pub ducking_level: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            audio_proxy_host: None,
            max_volume_boost: 4.0,
            ducking_level: 0.15,
        }
    }
}

/// Resolves which config file (if any) should be loaded
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Resolve config file path following the priority order
    ///
    /// Returns `None` when no candidate file exists.
    pub fn resolve(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Platform config directory
        default_config_path().filter(|path| path.exists())
    }

    /// Resolve and load the config, falling back to compiled defaults
    pub fn load(&self) -> Result<TomlConfig> {
        match self.resolve() {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                load_toml_config(&path)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using compiled defaults",
                    path.display()
                );
                Ok(TomlConfig::default())
            }
            None => {
                debug!("No config file found, using compiled defaults");
                Ok(TomlConfig::default())
            }
        }
    }
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
}

/// Platform default data directory (persistent settings storage)
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./vot_data"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Write a TOML config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;
    write_atomic(path, content.as_bytes())
}

/// Write bytes to `path` via a sibling temp file and rename
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    std::fs::write(&temp_path, contents)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(Error::Io(e));
    }
    Ok(())
}
