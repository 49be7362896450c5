//! Local settings cache
//!
//! Best-effort persisted copy of the last known good settings document.
//! Everything stored here is disposable: a missing or unreadable entry is
//! a cold start, never an error shown to anyone.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::CacheError;

/// Fixed key the settings document is cached under
pub const SETTINGS_CACHE_KEY: &str = "site_settings";

/// Persistent key/value storage for cached documents
///
/// Synchronous on purpose: cold start must read the cache before any
/// network call can resolve.
pub trait CacheStore: Send + Sync {
    /// Raw entry, `None` when absent
    fn load(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Overwrite the entry
    fn store(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove the entry; removing a missing entry is not an error
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// File-backed store: one `<dir>/<key>.json` file per entry
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;

        // 先写临时文件再 rename，避免半截写入
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.lock().insert(key.to_string(), value.into());
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

impl<T: CacheStore + ?Sized> CacheStore for std::sync::Arc<T> {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).load(key)
    }

    fn store(&self, key: &str, value: &str) -> Result<(), CacheError> {
        (**self).store(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        (**self).remove(key)
    }
}
