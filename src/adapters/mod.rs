//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Snapshot persistence (file, in-memory)
//! - `clock` - Wall clock and a manual clock for tests
//! - `title` - Terminal window title and a recorder for tests

pub mod clock;
pub mod storage;
pub mod title;

pub use clock::{ManualClock, SystemClock};
pub use storage::{FileSnapshotStorage, InMemorySnapshotStorage};
pub use title::{RecordingTitle, TerminalTitle};
