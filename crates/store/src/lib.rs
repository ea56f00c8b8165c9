//! Persisted project and task stores.
//!
//! Both stores keep their whole collection in memory and write a full
//! snapshot through a [`KeyValueStore`] after every mutation. The
//! [`Workspace`] owns one of each over a shared storage handle and enforces
//! the project -> task ownership on removal.

pub mod config;
pub mod error;
pub mod kv;
pub mod projects;
pub mod tasks;
pub mod workspace;

pub use config::StoreConfig;
pub use error::{StorageError, StoreError};
pub use kv::{FileStore, KeyValueStore, MemoryStore, SharedStore};
pub use projects::ProjectStore;
pub use tasks::TaskStore;
pub use workspace::Workspace;
