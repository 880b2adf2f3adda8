//! Persistent key/value storage capability
//!
//! The client only needs get/set/delete; the host environment decides where
//! values actually live. Two implementations ship here: an in-memory map for
//! tests and embedding, and a JSON file store used by the CLI.

use crate::{config, Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Get/set/delete capability over JSON values
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Typed access on top of any `Storage`
pub trait StorageExt: Storage {
    /// Read `key`, falling back to `default` when absent or of the wrong shape
    fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(key, error = %e, "Stored value has unexpected shape, using default");
                default
            }),
            None => default,
        }
    }

    fn set_value<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set(key, serde_json::to_value(value)?)
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Storage("lock poisoned".to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Storage("lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}

/// JSON object persisted to a single file, rewritten atomically on every change
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonFileStorage {
    /// Open (or lazily create) the store at `path`
    ///
    /// A missing file starts an empty store; a corrupt file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&content)? {
                    Value::Object(map) => map,
                    _ => {
                        return Err(Error::Config(format!(
                            "{} does not contain a JSON object",
                            path.display()
                        )))
                    }
                }
            }
        } else {
            debug!("Settings file {} not found, starting empty", path.display());
            Map::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<()> {
        let content = serde_json::to_vec_pretty(values)?;
        config::write_atomic(&self.path, &content)
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Storage("lock poisoned".to_string()))?;
        values.insert(key.to_string(), value);
        self.persist(&values)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Storage("lock poisoned".to_string()))?;
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}
