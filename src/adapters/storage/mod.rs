//! Storage Adapters
//!
//! Implementations of the SnapshotStorage port for persisting the cycle store.
//!
//! ## Available Adapters
//!
//! - **FileSnapshotStorage** - Stores the snapshot as a JSON file on disk
//! - **InMemorySnapshotStorage** - Stores the snapshot in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileSnapshotStorage, InMemorySnapshotStorage};
//!
//! // Production: file-based storage
//! let storage = FileSnapshotStorage::new("./data");
//!
//! // Testing: in-memory storage
//! let storage = InMemorySnapshotStorage::new();
//! ```

mod codec;
mod file_snapshot_storage;
mod in_memory_snapshot_storage;

pub use codec::{decode, encode};
pub use file_snapshot_storage::FileSnapshotStorage;
pub use in_memory_snapshot_storage::InMemorySnapshotStorage;
