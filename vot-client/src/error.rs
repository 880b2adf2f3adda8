//! Error types for vot-client
//!
//! Propagation policy:
//! - `Network` / `ProtocolDecode` bubble to the caller unmodified
//! - `ServerBusy` never leaves the orchestrator; it only drives the retry path
//! - `VideoIdMismatch` is swallowed by the orchestrator into an empty result
//! - `AudioFormatUnsupported` is a signal to switch proxying/backends

use thiserror::Error;

/// Main error type for vot-client
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure or non-200 HTTP status
    #[error("Network error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Malformed or truncated binary payload
    #[error("Protocol decode error: {0}")]
    ProtocolDecode(#[from] prost::DecodeError),

    /// Backend is still processing the request
    #[error("Server busy, {remaining_time}s remaining")]
    ServerBusy { remaining_time: i32 },

    /// Backend explicitly refused or aborted the request
    #[error("Server error: {0}")]
    Server(String),

    /// The page moved on to another video while a request was in flight
    #[error("Video changed from {expected} to {}", .actual.as_deref().unwrap_or("<none>"))]
    VideoIdMismatch {
        expected: String,
        actual: Option<String>,
    },

    /// Translation finished without a playable audio URL
    #[error("Audio not received")]
    AudioNotReceived,

    /// Playback blocked until the user interacts with the page
    #[error("Playback requires a user gesture")]
    PermissionDenied,

    /// Current backend cannot play this source
    #[error("Audio format unsupported: {0}")]
    AudioFormatUnsupported(String),

    /// Playback backend failure not covered above
    #[error("Playback error: {0}")]
    Playback(String),

    /// Subtitle download or parse failure
    #[error("Subtitle error: {0}")]
    Subtitle(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors from vot-common (config, storage)
    #[error(transparent)]
    Common(#[from] vot_common::Error),
}

impl Error {
    pub fn network(message: impl Into<String>) -> Self {
        Error::Network {
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Error::Network {
            status: Some(status),
            message: message.into(),
        }
    }

    /// HTTP status attached to a network error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Network { status, .. } => *status,
            _ => None,
        }
    }
}

/// Convenience Result type using vot-client Error
pub type Result<T> = std::result::Result<T, Error>;
