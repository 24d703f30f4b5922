//! Cycle entity - one timed work session.

use crate::domain::foundation::{CycleId, CycleStatus, StateMachine, Timestamp, ValidationError};

/// A single timed work session.
///
/// Cycles are values: finishing one returns a new `Cycle` and leaves the
/// original untouched, which keeps every store snapshot immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    id: CycleId,
    task: String,
    planned_minutes: u32,
    created_at: Timestamp,
    completed_at: Option<Timestamp>,
    interrupted_at: Option<Timestamp>,
}

impl Cycle {
    /// Creates a new running cycle.
    ///
    /// Input is expected to be pre-validated by the caller.
    pub fn new(
        id: CycleId,
        task: impl Into<String>,
        planned_minutes: u32,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            task: task.into(),
            planned_minutes,
            created_at,
            completed_at: None,
            interrupted_at: None,
        }
    }

    /// Reconstitutes a cycle from persisted data.
    ///
    /// Performs no validation; `CycleStore::validate` checks the result.
    pub fn reconstitute(
        id: CycleId,
        task: String,
        planned_minutes: u32,
        created_at: Timestamp,
        completed_at: Option<Timestamp>,
        interrupted_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            task,
            planned_minutes,
            created_at,
            completed_at,
            interrupted_at,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    /// Returns the cycle ID.
    pub fn id(&self) -> CycleId {
        self.id
    }

    /// Returns the task label.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Returns the planned duration in minutes.
    pub fn planned_minutes(&self) -> u32 {
        self.planned_minutes
    }

    /// Returns the planned duration in seconds.
    pub fn planned_seconds(&self) -> u64 {
        u64::from(self.planned_minutes) * 60
    }

    /// Returns the instant the cycle started.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns when the cycle ran to completion, if it did.
    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    /// Returns when the cycle was interrupted, if it was.
    pub fn interrupted_at(&self) -> Option<Timestamp> {
        self.interrupted_at
    }

    /// Derives the lifecycle status from the outcome timestamps.
    pub fn status(&self) -> CycleStatus {
        match (self.completed_at, self.interrupted_at) {
            (Some(_), _) => CycleStatus::Completed,
            (None, Some(_)) => CycleStatus::Interrupted,
            (None, None) => CycleStatus::Running,
        }
    }

    /// Returns true if neither outcome has been recorded.
    pub fn is_running(&self) -> bool {
        self.status() == CycleStatus::Running
    }

    /// Returns true if both outcome timestamps are set (never legal).
    pub fn has_conflicting_outcome(&self) -> bool {
        self.completed_at.is_some() && self.interrupted_at.is_some()
    }

    // ───────────────────────────────────────────────────────────────
    // Transitions
    // ───────────────────────────────────────────────────────────────

    /// Returns this cycle marked as completed at `at`.
    pub fn complete(&self, at: Timestamp) -> Result<Self, ValidationError> {
        self.status().transition_to(CycleStatus::Completed)?;
        Ok(Self {
            completed_at: Some(at),
            ..self.clone()
        })
    }

    /// Returns this cycle marked as interrupted at `at`.
    pub fn interrupt(&self, at: Timestamp) -> Result<Self, ValidationError> {
        self.status().transition_to(CycleStatus::Interrupted)?;
        Ok(Self {
            interrupted_at: Some(at),
            ..self.clone()
        })
    }
}
