//! Key-value persistence port and its backends.
//!
//! Values are opaque strings (JSON snapshots in practice). Absence of a key
//! is not an error.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// Key holding the array of projects.
pub const PROJECTS_KEY: &str = "projects";
/// Key holding the selected project id (raw string, not JSON).
pub const CURRENT_PROJECT_KEY: &str = "currentProjectId";
/// Key holding the `projectId -> [Task]` mapping.
pub const TASKS_KEY: &str = "tasks_by_project_v1";

/// String-keyed, string-valued storage.
pub trait KeyValueStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to a storage backend.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Read and parse a JSON snapshot, falling back to `T::default()`.
///
/// A missing key, an unreadable backend and an unparsable value all yield the
/// default. The stored value is left as it is.
pub fn load_json<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read snapshot, starting empty");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unparsable snapshot");
            T::default()
        }
    }
}

/// Serialize `value` and write it under `key`.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.save(key, &raw)
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process backend. Clones share the same entries, so a test can keep a
/// handle and inspect what a store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value currently stored under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key under a data directory.
///
/// Writes go to a `.tmp` sibling which is then renamed over the target, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the data directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.save("k", "v").unwrap();
        assert_eq!(handle.get("k").as_deref(), Some("v"));

        handle.remove("k").unwrap();
        assert_eq!(store.load("k").unwrap(), None);
    }

    #[test]
    fn load_json_defaults_on_missing_and_corrupt_values() {
        let store = MemoryStore::new();
        let missing: Vec<u32> = load_json(&store, "numbers");
        assert!(missing.is_empty());

        store.save("numbers", "[1, 2,").unwrap();
        let corrupt: Vec<u32> = load_json(&store, "numbers");
        assert!(corrupt.is_empty());
        // The corrupted value is not touched.
        assert_eq!(store.get("numbers").as_deref(), Some("[1, 2,"));
    }

    #[test]
    fn save_json_round_trips_through_load_json() {
        let store = MemoryStore::new();
        save_json(&store, "numbers", &vec![1u32, 2, 3]).unwrap();
        let loaded: Vec<u32> = load_json(&store, "numbers");
        assert_eq!(loaded, vec![1, 2, 3]);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.load(PROJECTS_KEY).unwrap(), None);
        store.save(PROJECTS_KEY, "[]").unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.load(PROJECTS_KEY).unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("projects.json").exists());
        assert!(!dir.path().join("projects.json.tmp").exists());
    }

    #[test]
    fn file_store_sanitizes_keys_and_ignores_missing_removals() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.save("tasks:default", "[]").unwrap();
        assert!(dir.path().join("tasks_default.json").exists());

        store.remove("tasks:default").unwrap();
        store.remove("tasks:default").unwrap();
        assert_eq!(store.load("tasks:default").unwrap(), None);
    }
}
