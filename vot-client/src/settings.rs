//! User preferences kept in the host's persistent storage

use crate::playback::PlaybackPreferences;
use crate::Result;
use serde::{Deserialize, Serialize};
use vot_common::storage::{Storage, StorageExt};

const KEY_RESPONSE_LANGUAGE: &str = "responseLanguage";
const KEY_USE_NEW_MODEL: &str = "useNewModel";
const KEY_VOLUME: &str = "defaultVolume";
const KEY_PRESERVE_PITCH: &str = "preservePitch";
const KEY_ENABLE_DUCKING: &str = "enabledAutoVolume";
const KEY_DUCKING_LEVEL: &str = "autoVolume";
const KEY_AUDIO_PROXY: &str = "translateProxyEnabled";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub response_language: String,
    pub model_variant: bool,
    /// Translated audio volume, 1.0 = 100%
    pub volume: f64,
    pub preserve_pitch: bool,
    pub ducking_enabled: bool,
    /// Original track level while translation plays
    pub ducking_level: f64,
    pub audio_proxy: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            response_language: "ru".to_string(),
            model_variant: false,
            volume: 1.0,
            preserve_pitch: false,
            ducking_enabled: true,
            ducking_level: 0.15,
            audio_proxy: false,
        }
    }
}

impl UserSettings {
    /// Read every preference, defaulting missing or malformed values
    pub fn load(storage: &dyn Storage) -> Self {
        let defaults = Self::default();
        Self {
            response_language: storage.get_or(KEY_RESPONSE_LANGUAGE, defaults.response_language),
            model_variant: storage.get_or(KEY_USE_NEW_MODEL, defaults.model_variant),
            volume: storage.get_or(KEY_VOLUME, defaults.volume),
            preserve_pitch: storage.get_or(KEY_PRESERVE_PITCH, defaults.preserve_pitch),
            ducking_enabled: storage.get_or(KEY_ENABLE_DUCKING, defaults.ducking_enabled),
            ducking_level: storage.get_or(KEY_DUCKING_LEVEL, defaults.ducking_level),
            audio_proxy: storage.get_or(KEY_AUDIO_PROXY, defaults.audio_proxy),
        }
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<()> {
        storage.set_value(KEY_RESPONSE_LANGUAGE, &self.response_language)?;
        storage.set_value(KEY_USE_NEW_MODEL, &self.model_variant)?;
        storage.set_value(KEY_VOLUME, &self.volume)?;
        storage.set_value(KEY_PRESERVE_PITCH, &self.preserve_pitch)?;
        storage.set_value(KEY_ENABLE_DUCKING, &self.ducking_enabled)?;
        storage.set_value(KEY_DUCKING_LEVEL, &self.ducking_level)?;
        storage.set_value(KEY_AUDIO_PROXY, &self.audio_proxy)?;
        Ok(())
    }

    /// Ducking level for the sync engine, `None` when disabled
    pub fn ducking(&self) -> Option<f64> {
        self.ducking_enabled.then_some(self.ducking_level.clamp(0.0, 1.0))
    }

    pub fn playback_preferences(&self) -> PlaybackPreferences {
        PlaybackPreferences {
            preserve_pitch: self.preserve_pitch,
            boost_original_volume: self.volume > 1.0,
        }
    }
}
