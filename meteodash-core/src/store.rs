//! Durable key-value slots for favorites, recents, theme and unit preference.
//!
//! Every slot is loaded and saved independently as a JSON document. Reads fall
//! back to a default on absence or corruption, and writes are best effort: a
//! failing backend is logged and the in-memory value stays authoritative for
//! the rest of the session.

use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tokio::sync::watch;

use crate::error::StoreError;

/// Slot names used by the dashboard.
pub mod keys {
    pub const FAVORITES: &str = "favorites";
    pub const RECENTS: &str = "recents";
    pub const THEME: &str = "theme";
    pub const UNIT: &str = "unit";
}

/// Raw string storage underneath [`Store`].
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        // Write to a sibling temp file first so a crash never leaves a half-written slot.
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Process-local backend; nothing outlives the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw slot value, bypassing serialization.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.insert_raw(key, value);
        Ok(())
    }
}

/// JSON (de)serialization over a [`StorageBackend`]. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Load a slot, returning `default` when it is absent, unreadable or malformed.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                tracing::warn!(key, error = %err, "falling back to default for stored slot");
                default
            }
        }
    }

    /// Persist a slot. Failures are logged and swallowed.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(err) = self.try_save(key, value) {
            tracing::warn!(key, error = %err, "failed to persist slot; keeping in-memory value");
        }
    }

    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.backend.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)
    }
}

/// An observable in-memory value mirrored into one store slot.
///
/// Every mutation replaces the in-memory value first, notifies subscribers,
/// then writes through to the backend.
#[derive(Debug)]
pub struct Persisted<T> {
    key: &'static str,
    store: Store,
    tx: watch::Sender<T>,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn load(store: Store, key: &'static str, default: T) -> Self {
        let value = store.load(key, default);
        let (tx, _rx) = watch::channel(value);
        Self { key, store, tx }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Inspect the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
        self.persist();
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
        self.persist();
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    fn persist(&self) {
        let value = self.tx.borrow();
        self.store.save(self.key, &*value);
    }
}
