//! Test Helper Utilities
//!
//! Shared utilities for testing vot-client

#![allow(dead_code)]

pub mod backend;
pub mod media;

// Re-export commonly used items
pub use backend::{
    api_settings, client_with, finished, orchestrator_for, stream_live, stream_pending,
    translation_settings, waiting, MockTransport, Reply,
};
pub use media::{FakeElement, FakeGain, FakePlayer, FakeVideo, MediaState};
