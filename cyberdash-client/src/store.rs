//! Local persistent key-value store.
//!
//! Values are JSON documents under namespaced keys. Callers treat the store
//! as best effort: a failed read or write is logged and the in-memory state
//! stays authoritative.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Persisted chat transcript.
pub const CHAT_KEY: &str = "csd:chat:v1";
/// Analytics opt-in flag.
pub const ANALYTICS_KEY: &str = "csd:analytics:v1";
/// Shell settings document.
pub const SETTINGS_KEY: &str = "csd:settings:v1";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Store lock poisoned")]
    Poisoned,
}

/// String-keyed JSON storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read a typed value. Missing keys and mistyped values both yield `None`.
pub fn get_typed<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    Ok(store
        .get(key)?
        .and_then(|value| serde_json::from_value(value).ok()))
}

pub fn set_typed<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    store.set(key, serde_json::to_value(value)?)
}

// ============================================================================
// MEMORY STORE
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// FILE STORE
// ============================================================================

/// One JSON object on disk, rewritten in full on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Read-modify-write. An unparseable document is moved aside to
    /// `<name>.corrupt` and replaced, so one bad write never blocks the rest.
    fn update(&self, f: impl FnOnce(&mut Map<String, Value>)) -> Result<(), StoreError> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StoreError::Serde(err)) => {
                let aside = self.path.with_extension("corrupt");
                warn!(
                    error = %err,
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    "Store document unreadable, starting fresh"
                );
                std::fs::rename(&self.path, &aside)?;
                Map::new()
            }
            Err(err) => return Err(err),
        };
        f(&mut entries);
        self.save(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
