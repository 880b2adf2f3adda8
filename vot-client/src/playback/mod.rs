//! Translated audio playback kept in sync with the primary video

pub mod backend;
pub mod direct;
pub mod engine;
pub mod events;
pub mod time_stretch;

pub use backend::{
    select_backend, AudioBackend, BackendKind, GainNode, GranularPlayer, MediaElement,
    PlatformCapabilities, PlaybackPreferences, PlayError,
};
pub use direct::DirectBackend;
pub use engine::{PlaybackSyncEngine, PrimaryVideo};
pub use events::{SyncAction, SyncMode, VideoClock};
pub use time_stretch::TimeStretchBackend;
