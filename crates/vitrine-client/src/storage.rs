//! Durable key-value backends for persisted client state.
//!
//! # Design
//! - Stores serialise their persisted slice explicitly through [`persist_state`]
//!   and [`load_state`]; nothing is written implicitly.
//! - Backends only move opaque strings so tests can swap in [`MemoryStorage`].
//! - Unreadable entries load as absent; callers start from a clean state.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

/// Namespace holding `{user, token, isAuthenticated}`.
pub const AUTH_STORAGE_KEY: &str = "auth-storage";
/// Namespace holding `{currentTenant}`.
pub const TENANT_STORAGE_KEY: &str = "tenant-storage";

/// Durable string storage keyed by namespace.
pub trait StateStorage: Send + Sync + Debug {
    /// Read the raw document stored under `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be read.
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError>;

    /// Replace the document stored under `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be written.
    fn save(&self, namespace: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the document stored under `namespace`; missing entries are fine.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be written.
    fn remove(&self, namespace: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Clones share the same entries, so a clone handed to
/// a freshly constructed store behaves like a reload.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Construct an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(namespace).cloned())
    }

    fn save(&self, namespace: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(namespace.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<(), StorageError> {
        self.lock().remove(namespace);
        Ok(())
    }
}

/// Storage writing one `<namespace>.json` file per namespace under a directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`; the directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of this storage.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{namespace}.json"))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(namespace);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn save(&self, namespace: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(namespace);
        // Write-then-rename keeps a concurrent reader from seeing a torn file.
        let staging = self.dir.join(format!(".{namespace}.json.tmp"));
        fs::write(&staging, value).map_err(|source| StorageError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StorageError::Io { path, source })
    }

    fn remove(&self, namespace: &str) -> Result<(), StorageError> {
        let path = self.path_for(namespace);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// Serialise `state` as JSON and store it under `namespace`.
///
/// # Errors
///
/// Returns [`StorageError`] when encoding or the backend write fails.
pub fn persist_state<T: Serialize>(
    storage: &dyn StateStorage,
    namespace: &str,
    state: &T,
) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(state).map_err(|source| StorageError::Serialize {
        namespace: namespace.to_string(),
        source,
    })?;
    storage.save(namespace, &encoded)
}

/// Load and decode the document stored under `namespace`.
///
/// Missing, unreadable and corrupt entries all yield `None`; the latter two
/// are logged.
#[must_use]
pub fn load_state<T: DeserializeOwned>(storage: &dyn StateStorage, namespace: &str) -> Option<T> {
    let raw = match storage.load(namespace) {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!(namespace, error = %err, "failed to read persisted state");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(state) => Some(state),
        Err(source) => {
            let err = StorageError::Deserialize {
                namespace: namespace.to_string(),
                source,
            };
            tracing::warn!(namespace, error = %err, "discarding corrupt persisted state");
            None
        }
    }
}
