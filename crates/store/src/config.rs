use std::path::PathBuf;
use std::sync::Arc;

use crate::error::StorageError;
use crate::kv::{FileStore, MemoryStore, SharedStore};

/// Storage settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory for file-backed snapshots. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// Remove a project's tasks together with the project (default: `true`).
    pub cascade_deletes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            cascade_deletes: true,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default        |
    /// |-------------------|----------------|
    /// | `DATA_DIR`        | unset (memory) |
    /// | `CASCADE_DELETES` | `true`         |
    pub fn from_env() -> Self {
        let data_dir = std::env::var("DATA_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let cascade_deletes: bool = std::env::var("CASCADE_DELETES")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("CASCADE_DELETES must be `true` or `false`");

        Self {
            data_dir,
            cascade_deletes,
        }
    }

    /// Open the configured storage backend.
    pub fn open_storage(&self) -> Result<SharedStore, StorageError> {
        match &self.data_dir {
            Some(dir) => {
                let store = FileStore::open(dir)?;
                tracing::info!(dir = %dir.display(), "Using file-backed storage");
                Ok(Arc::new(store))
            }
            None => {
                tracing::info!("DATA_DIR not set, using in-memory storage");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }
}
