use syncup_core::error::CoreError;

/// Failure of the underlying key-value storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Error returned by store mutations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level error (validation, unknown parent).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The in-memory change was applied but the snapshot could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
