use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fs::{self, create_dir_all};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StoreError;

pub const TEMPLATES_KEY: &str = "templates";
pub const STORY_KEY: &str = "story";
pub const STORYBOARD_KEY: &str = "storyboard";
pub const LANGUAGE_KEY: &str = "language";

// A durable key-value blob store. Values are whole JSON documents.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // Written to a sibling temp file first, then renamed over the entry, so a
    // crash mid-write never leaves a truncated document behind.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        create_dir_all(&self.dir)?; // Ensure the data directory exists.
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }
}

// Keeps everything in memory. Used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One persisted value, read once on open and rewritten in full after every update.
///
/// Updates are pure functions of the previous value. The lock is only held while the
/// new value is computed and written, never across an await, so concurrent requests
/// each see the latest value at their own mutation points.
pub struct Persisted<T> {
    store: Arc<dyn BlobStore>,
    key: &'static str,
    value: Mutex<T>,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    /// Loads `key`, falling back to `T::default()` if it is absent or malformed.
    pub fn open(store: Arc<dyn BlobStore>, key: &'static str) -> Self {
        let value = match store.get(key) {
            Ok(Some(data)) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Discarding malformed '{key}' entry: {e}");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                log::error!("Failed to read '{key}' from store: {e}");
                T::default()
            }
        };
        Self {
            store,
            key,
            value: Mutex::new(value),
        }
    }

    pub fn get(&self) -> T {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, value: T) {
        self.update(|_| value);
    }

    /// Replaces the value with `f(previous)` and persists it.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        self.modify(|previous| (f(previous), ()));
    }

    /// Like `update`, but `f` also hands back a result for the caller.
    pub fn modify<R>(&self, f: impl FnOnce(&T) -> (T, R)) -> R {
        let mut value = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        let (next, result) = f(&value);
        self.persist(&next);
        *value = next;
        result
    }

    fn persist(&self, value: &T) {
        let written = serde_json::to_string_pretty(value)
            .map_err(StoreError::from)
            .and_then(|data| self.store.set(self.key, &data));
        if let Err(e) = written {
            log::error!("Failed to persist '{}': {e}", self.key);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Persisted<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persisted")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}
