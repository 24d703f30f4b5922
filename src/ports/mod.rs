//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SnapshotStorage` - Durable key-value slot for the cycle store
//! - `Clock` - Current wall-clock instant
//! - `TitleSink` - Host window title

mod clock;
mod snapshot_storage;
mod title_sink;

pub use clock::Clock;
pub use snapshot_storage::{SnapshotStorage, StorageError, STATE_KEY};
pub use title_sink::TitleSink;
