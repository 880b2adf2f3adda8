//! # VOT Client Library (vot-client)
//!
//! Voice-over translation client for online video.
//!
//! **Purpose:** Request machine voice translation of a video from the
//! translation backend, wait out server-side processing, and play the
//! translated audio in step with the original video.
//!
//! **Architecture:**
//! - `protocol`: protobuf message schemas and codec
//! - `client`: signed HTTP requests with a fallback transport
//! - `orchestrator`: retry/abort/cache state machines and stream keepalive
//! - `subtitles`: subtitle listing, parsing and conversion
//! - `playback`: secondary audio backends and lip-sync
//! - `session`: one playback session wiring the above together

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod playback;
pub mod protocol;
pub mod session;
pub mod settings;
pub mod subtitles;

pub use client::SignedRequestClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use orchestrator::TranslationOrchestrator;
pub use playback::PlaybackSyncEngine;
pub use session::VideoSession;
pub use subtitles::SubtitleProcessor;
