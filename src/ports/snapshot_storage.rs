//! Snapshot Storage Port - Interface for persisting the cycle store.
//!
//! The whole store is written as one record under a fixed, versioned key
//! after every transition, and read back once at startup.

use async_trait::async_trait;

use crate::domain::cycle::CycleStore;

/// Key of the single slot holding the persisted store.
pub const STATE_KEY: &str = "cycles-state:1.0.0";

/// Errors that can occur during snapshot storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to serialize snapshot: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize snapshot: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting and loading the cycle store snapshot
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Load the persisted snapshot
    ///
    /// # Returns
    /// `None` when nothing has been saved yet
    ///
    /// # Errors
    /// Returns `StorageError::DeserializationFailed` if the stored bytes
    /// cannot be decoded
    async fn load(&self) -> Result<Option<CycleStore>, StorageError>;

    /// Replace the persisted snapshot with `store`
    ///
    /// # Errors
    /// Returns `StorageError` if the write fails
    async fn save(&self, store: &CycleStore) -> Result<(), StorageError>;
}
