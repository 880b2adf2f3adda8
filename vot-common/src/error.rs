//! Errors shared by the VOT crates

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file unreadable, malformed or out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored settings value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage backend left in an unusable state
    #[error("Storage error: {0}")]
    Storage(String),
}
