//! # VOT Common Library
//!
//! Shared code for the voice-over translation client crates:
//! - Error type and `Result` alias
//! - TOML configuration loading and resolution
//! - Event types (`VotEvent`) and the `EventBus` they travel on
//! - Capability interfaces for persistent storage and localization
//! - Time helpers

pub mod config;
pub mod error;
pub mod events;
pub mod localization;
pub mod storage;
pub mod time;

pub use error::{Error, Result};
pub use events::{EventBus, VotEvent};
pub use localization::Localizer;
pub use storage::Storage;
