//! Audio backend abstraction and the platform handles backends wrap

use super::events::{SyncAction, SyncMode, VideoClock};
use crate::Error;
use async_trait::async_trait;
use vot_common::events::PlaybackFailure;

/// Why a play attempt was refused by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    /// A user gesture is required first
    NotAllowed(String),
    /// The source cannot be decoded
    NotSupported(String),
    /// Interrupted by a pause before it started
    Aborted,
    Other(String),
}

impl PlayError {
    /// Error surfaced to the caller; `None` for interruptions that need no handling
    pub fn into_error(self) -> Option<Error> {
        match self {
            PlayError::NotAllowed(_) => Some(Error::PermissionDenied),
            PlayError::NotSupported(msg) => Some(Error::AudioFormatUnsupported(msg)),
            PlayError::Aborted => None,
            PlayError::Other(msg) => Some(Error::Playback(msg)),
        }
    }

    pub fn failure(&self) -> PlaybackFailure {
        match self {
            PlayError::NotAllowed(_) => PlaybackFailure::PermissionDenied,
            PlayError::NotSupported(_) => PlaybackFailure::FormatUnsupported,
            PlayError::Aborted | PlayError::Other(_) => PlaybackFailure::Other,
        }
    }
}

impl std::fmt::Display for PlayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayError::NotAllowed(msg) => write!(f, "not allowed: {}", msg),
            PlayError::NotSupported(msg) => write!(f, "not supported: {}", msg),
            PlayError::Aborted => write!(f, "aborted"),
            PlayError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Plain media element owned by the host
#[async_trait]
pub trait MediaElement: Send + Sync {
    async fn play(&mut self) -> Result<(), PlayError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn src(&self) -> Option<String>;
    fn set_src(&mut self, src: Option<String>);
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, secs: f64);
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
}

/// Gain stage of an audio-processing graph
pub trait GainNode: Send + Sync {
    fn gain(&self) -> f64;
    fn set_gain(&mut self, gain: f64);
}

/// Pitch-preserving granular player
#[async_trait]
pub trait GranularPlayer: Send + Sync {
    async fn play(&mut self) -> Result<(), PlayError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn src(&self) -> Option<String>;
    fn set_src(&mut self, src: Option<String>);
    fn position(&self) -> f64;
    fn seek(&mut self, secs: f64);
    fn tempo(&self) -> f64;
    fn set_tempo(&mut self, tempo: f64);
    fn gain_db(&self) -> f64;
    fn set_gain_db(&mut self, db: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Direct,
    TimeStretch,
}

/// Capability set shared by both backends
#[async_trait]
pub trait AudioBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn play(&mut self) -> Result<(), PlayError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;

    /// Stop and detach the current source
    fn clear(&mut self);

    /// Linear amplitude, 1.0 = unchanged
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);

    fn src(&self) -> Option<String>;
    fn set_src(&mut self, url: &str);

    fn current_time(&self) -> f64;
    fn playback_rate(&self) -> f64;

    /// Copy position and rate from the primary video
    fn align(&mut self, clock: &VideoClock);

    /// Realign, then resume or pause as `mode` demands
    async fn lip_sync(&mut self, mode: SyncMode, clock: &VideoClock) -> Result<(), PlayError> {
        self.align(clock);
        match mode.action() {
            SyncAction::Resume => self.play().await,
            SyncAction::Halt => {
                self.pause();
                Ok(())
            }
            SyncAction::AlignOnly => Ok(()),
        }
    }
}

/// What the host environment offers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformCapabilities {
    pub audio_graph: bool,
}

/// What the user asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackPreferences {
    pub preserve_pitch: bool,
    pub boost_original_volume: bool,
}

/// Pick the backend for a session
pub fn select_backend(caps: PlatformCapabilities, prefs: PlaybackPreferences) -> BackendKind {
    if (prefs.preserve_pitch || prefs.boost_original_volume) && caps.audio_graph {
        BackendKind::TimeStretch
    } else {
        BackendKind::Direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_backend() {
        let graph = PlatformCapabilities { audio_graph: true };
        let no_graph = PlatformCapabilities { audio_graph: false };
        let pitch = PlaybackPreferences {
            preserve_pitch: true,
            boost_original_volume: false,
        };

        assert_eq!(select_backend(graph, pitch), BackendKind::TimeStretch);
        assert_eq!(select_backend(no_graph, pitch), BackendKind::Direct);
        assert_eq!(
            select_backend(graph, PlaybackPreferences::default()),
            BackendKind::Direct
        );
    }

    #[test]
    fn test_play_error_classification() {
        assert!(matches!(
            PlayError::NotAllowed("gesture".into()).into_error(),
            Some(Error::PermissionDenied)
        ));
        assert!(matches!(
            PlayError::NotSupported("hls".into()).into_error(),
            Some(Error::AudioFormatUnsupported(_))
        ));
        assert!(PlayError::Aborted.into_error().is_none());
    }
}
