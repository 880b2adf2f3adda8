//! vot-client runtime configuration
//!
//! Converts the file-level `TomlConfig` into the values the client actually
//! uses (durations, base URLs) and performs validation.

use crate::{Error, Result};
use std::time::Duration;
use vot_common::config::TomlConfig;

/// Runtime configuration for the client library
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api: ApiSettings,
    pub translation: TranslationSettings,
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub hmac_key: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub fallback_proxy: Option<String>,
}

impl ApiSettings {
    /// `https://{host}{path}`
    pub fn url(&self, path: &str) -> String {
        format!("https://{}{}", self.host, path)
    }
}

#[derive(Debug, Clone)]
pub struct TranslationSettings {
    pub retry_with_subtitles: Duration,
    pub retry_without_subtitles: Duration,
    pub cache_ttl: Duration,
    pub default_duration_secs: f64,
}

#[derive(Debug, Clone)]
pub struct PlaybackSettings {
    pub audio_proxy_host: Option<String>,
    pub max_volume_boost: f64,
    pub ducking_level: f64,
}

impl ClientConfig {
    pub fn from_toml(toml: &TomlConfig) -> Result<Self> {
        if toml.api.host.trim().is_empty() {
            return Err(Error::Config("api.host must not be empty".to_string()));
        }
        if toml.api.hmac_key.is_empty() {
            return Err(Error::Config("api.hmac_key must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&toml.playback.ducking_level) {
            return Err(Error::Config(format!(
                "playback.ducking_level must be within 0.0..=1.0, got {}",
                toml.playback.ducking_level
            )));
        }
        if toml.playback.max_volume_boost < 1.0 {
            return Err(Error::Config(format!(
                "playback.max_volume_boost must be at least 1.0, got {}",
                toml.playback.max_volume_boost
            )));
        }

        Ok(Self::build(toml))
    }

    fn build(toml: &TomlConfig) -> Self {
        let default_duration_secs = if toml.translation.default_duration_secs.is_finite()
            && toml.translation.default_duration_secs > 0.0
        {
            toml.translation.default_duration_secs
        } else {
            TomlConfig::default().translation.default_duration_secs
        };

        Self {
            api: ApiSettings {
                host: toml.api.host.trim().to_string(),
                hmac_key: toml.api.hmac_key.clone(),
                user_agent: toml.api.user_agent.clone(),
                timeout: Duration::from_secs(toml.api.timeout_secs.max(1)),
                fallback_proxy: toml.api.fallback_proxy.clone().filter(|p| !p.is_empty()),
            },
            translation: TranslationSettings {
                retry_with_subtitles: Duration::from_millis(toml.translation.retry_with_subtitles_ms),
                retry_without_subtitles: Duration::from_millis(
                    toml.translation.retry_without_subtitles_ms,
                ),
                cache_ttl: Duration::from_secs(toml.translation.cache_ttl_secs),
                default_duration_secs,
            },
            playback: PlaybackSettings {
                audio_proxy_host: toml.playback.audio_proxy_host.clone().filter(|h| !h.is_empty()),
                max_volume_boost: toml.playback.max_volume_boost,
                ducking_level: toml.playback.ducking_level,
            },
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::build(&TomlConfig::default())
    }
}

/// Route a translated audio URL through the audio proxy host
///
/// `https://vtrans.s3-private.mds.yandex.net/tts/prod/<file>?<query>` becomes
/// `https://{proxy}/video-translation/audio-proxy/tts/prod/<file>?<query>`.
/// URLs without a path are returned unchanged.
pub fn rewrite_audio_url(url: &str, proxy_host: &str) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    match without_scheme.find('/') {
        Some(idx) => {
            let path = without_scheme[idx..].trim_start_matches('/');
            format!("https://{}/video-translation/audio-proxy/{}", proxy_host, path)
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ClientConfig::default();
        assert_eq!(config.translation.retry_with_subtitles, Duration::from_secs(20));
        assert_eq!(config.translation.retry_without_subtitles, Duration::from_secs(30));
        assert_eq!(config.translation.cache_ttl, Duration::from_secs(7200));
        assert_eq!(
            config.api.url("/video-translation/translate"),
            "https://api.browser.yandex.ru/video-translation/translate"
        );
    }

    #[test]
    fn test_invalid_ducking_rejected() {
        let mut toml = TomlConfig::default();
        toml.playback.ducking_level = 1.5;
        assert!(matches!(ClientConfig::from_toml(&toml), Err(Error::Config(_))));
    }

    #[test]
    fn test_non_positive_default_duration_falls_back() {
        let mut toml = TomlConfig::default();
        toml.translation.default_duration_secs = -1.0;
        let config = ClientConfig::from_toml(&toml).unwrap();
        assert_eq!(config.translation.default_duration_secs, 343.0);
    }

    #[test]
    fn test_rewrite_audio_url() {
        let url = "https://vtrans.s3-private.mds.yandex.net/tts/prod/abc.mp3?sign=1";
        assert_eq!(
            rewrite_audio_url(url, "proxy.example.org"),
            "https://proxy.example.org/video-translation/audio-proxy/tts/prod/abc.mp3?sign=1"
        );
        assert_eq!(rewrite_audio_url("https://host", "p"), "https://host");
    }
}
