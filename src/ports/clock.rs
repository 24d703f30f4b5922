//! Clock port - Source of the current wall-clock instant.

use crate::domain::foundation::Timestamp;

/// Port for reading the current time.
///
/// Reconciliation only ever asks for "now", so tests can substitute a
/// manually advanced clock for the system one.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}
