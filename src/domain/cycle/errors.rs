//! Cycle store error types.

use thiserror::Error;

use crate::domain::foundation::CycleId;

/// Errors raised by store transitions and snapshot validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleStoreError {
    #[error("Cycle {0} is already running")]
    AlreadyActive(CycleId),

    #[error("Cycle {0} already exists in the store")]
    DuplicateId(CycleId),

    #[error("Cycle {0} has already finished and cannot be started")]
    NotRunning(CycleId),

    #[error("Active cycle {0} does not exist in the store")]
    DanglingActive(CycleId),

    #[error("Active cycle {0} has already finished")]
    ActiveNotRunning(CycleId),

    #[error("Cycle {0} has no outcome but is not the active cycle")]
    OrphanedRunning(CycleId),

    #[error("Cycle {0} is marked both completed and interrupted")]
    ConflictingOutcome(CycleId),
}
