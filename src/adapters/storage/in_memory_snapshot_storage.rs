//! In-Memory Snapshot Storage Adapter
//!
//! Keeps the encoded snapshot in memory. Snapshots still go through the
//! JSON codec, so the adapter exercises the same format as the file one.
//! Useful for testing and development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::cycle::CycleStore;
use crate::ports::{SnapshotStorage, StorageError};

use super::codec;

/// In-memory storage for the cycle store snapshot
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStorage {
    slot: Arc<RwLock<Option<String>>>,
    fail_writes: Arc<AtomicBool>,
    save_count: Arc<AtomicUsize>,
}

impl InMemorySnapshotStorage {
    /// Create an empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage whose slot already holds `raw`, valid or not
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(raw.into()))),
            ..Self::default()
        }
    }

    /// Make every subsequent save fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the raw stored string
    pub async fn raw(&self) -> Option<String> {
        self.slot.read().await.clone()
    }

    /// Returns the number of successful saves
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStorage for InMemorySnapshotStorage {
    async fn load(&self) -> Result<Option<CycleStore>, StorageError> {
        let slot = self.slot.read().await;
        slot.as_deref().map(codec::decode).transpose()
    }

    async fn save(&self, store: &CycleStore) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::IoError("storage unavailable".to_string()));
        }

        let json = codec::encode(store)?;
        *self.slot.write().await = Some(json);
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
