//! Translation and playback state type definitions
//!
//! Supporting types carried by `VotEvent`.

use serde::{Deserialize, Serialize};

/// On-demand translation state
///
/// `Idle → Requesting → {Success, Pending, Aborted, Error}`; `Pending` loops
/// back to `Requesting` when its retry timer fires.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranslationState {
    Idle,
    Requesting,
    /// Backend still processing, one retry scheduled
    Pending,
    Success,
    /// Video changed or caller cancelled
    Aborted,
    Error,
}

impl TranslationState {
    /// States that end a `translate_video` call
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TranslationState::Success | TranslationState::Aborted | TranslationState::Error
        )
    }
}

impl std::fmt::Display for TranslationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationState::Idle => write!(f, "idle"),
            TranslationState::Requesting => write!(f, "requesting"),
            TranslationState::Pending => write!(f, "pending"),
            TranslationState::Success => write!(f, "success"),
            TranslationState::Aborted => write!(f, "aborted"),
            TranslationState::Error => write!(f, "error"),
        }
    }
}

/// Stream translation state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    Idle,
    Requesting,
    Pending,
    /// Keepalive active
    Running,
    Stopped,
    Aborted,
    Error,
}

impl std::fmt::Display for StreamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamState::Idle => write!(f, "idle"),
            StreamState::Requesting => write!(f, "requesting"),
            StreamState::Pending => write!(f, "pending"),
            StreamState::Running => write!(f, "running"),
            StreamState::Stopped => write!(f, "stopped"),
            StreamState::Aborted => write!(f, "aborted"),
            StreamState::Error => write!(f, "error"),
        }
    }
}

/// Why the secondary audio source could not play
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackFailure {
    /// Environment requires a user gesture first
    PermissionDenied,
    /// Source format cannot be decoded by the current backend
    FormatUnsupported,
    Other,
}

impl std::fmt::Display for PlaybackFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackFailure::PermissionDenied => write!(f, "permission_denied"),
            PlaybackFailure::FormatUnsupported => write!(f, "format_unsupported"),
            PlaybackFailure::Other => write!(f, "other"),
        }
    }
}
