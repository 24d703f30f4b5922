//! File-based Snapshot Storage Adapter
//!
//! Stores the cycle store as a single JSON file per slot key. Writes go to
//! a temporary sibling first and are renamed into place, so a crash never
//! leaves a half-written snapshot behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::cycle::CycleStore;
use crate::ports::{SnapshotStorage, StorageError, STATE_KEY};

use super::codec;

/// File-based storage for the cycle store snapshot
#[derive(Debug, Clone)]
pub struct FileSnapshotStorage {
    base_path: PathBuf,
    key: String,
}

impl FileSnapshotStorage {
    /// Create a file storage for the default slot key
    ///
    /// # Example
    /// ```ignore
    /// let storage = FileSnapshotStorage::new("./data");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self::with_key(base_path, STATE_KEY)
    }

    /// Create a file storage for a specific slot key
    pub fn with_key<P: AsRef<Path>>(base_path: P, key: impl Into<String>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            key: key.into(),
        }
    }

    /// Path of the snapshot file
    ///
    /// Characters that are awkward in file names are replaced with `_`.
    pub fn snapshot_path(&self) -> PathBuf {
        let file_stem: String = self
            .key
            .chars()
            .map(|c| match c {
                ':' | '/' | '\\' => '_',
                other => other,
            })
            .collect();
        self.base_path.join(format!("{}.json", file_stem))
    }

    fn temp_path(&self) -> PathBuf {
        self.snapshot_path().with_extension("json.tmp")
    }
}

#[async_trait]
impl SnapshotStorage for FileSnapshotStorage {
    async fn load(&self) -> Result<Option<CycleStore>, StorageError> {
        let file_path = self.snapshot_path();

        if !file_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&file_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        codec::decode(&json).map(Some)
    }

    async fn save(&self, store: &CycleStore) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        let json = codec::encode(store)?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, json)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        fs::rename(&temp_path, self.snapshot_path())
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(())
    }
}
