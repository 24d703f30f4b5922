//! CycleStore aggregate - the ordered cycle history plus the active cycle.
//!
//! Every transition is a pure function from one snapshot to the next. The
//! receiver is never modified, so observers can hold on to an old snapshot
//! and compare it with the new one.

use crate::domain::foundation::{CycleId, Timestamp};

use super::{Cycle, CycleStoreError};

/// A state transition request for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleAction {
    /// Append a new running cycle and make it active.
    AddCycle(Cycle),
    /// Mark the active cycle completed.
    CompleteActive,
    /// Mark the active cycle interrupted.
    InterruptActive,
}

/// Immutable snapshot of all cycles and the active cycle id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStore {
    cycles: Vec<Cycle>,
    active_cycle_id: Option<CycleId>,
}

impl CycleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstitutes a store from persisted data without checking invariants.
    pub fn reconstitute(cycles: Vec<Cycle>, active_cycle_id: Option<CycleId>) -> Self {
        Self {
            cycles,
            active_cycle_id,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    /// Returns all cycles in history order.
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Returns the active cycle id, if any.
    pub fn active_cycle_id(&self) -> Option<CycleId> {
        self.active_cycle_id
    }

    /// Resolves the active cycle id to its cycle.
    pub fn active_cycle(&self) -> Option<&Cycle> {
        self.active_cycle_id.and_then(|id| self.find(id))
    }

    /// Finds a cycle by id.
    pub fn find(&self, id: CycleId) -> Option<&Cycle> {
        self.cycles.iter().find(|c| c.id() == id)
    }

    /// Returns the latest creation instant in the history.
    pub fn latest_created_at(&self) -> Option<Timestamp> {
        self.cycles.iter().map(Cycle::created_at).max()
    }

    /// Returns the number of cycles.
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Returns true if no cycle was ever created.
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    // ───────────────────────────────────────────────────────────────
    // Transitions
    // ───────────────────────────────────────────────────────────────

    /// Appends a running cycle and makes it the active one.
    ///
    /// # Errors
    ///
    /// - `AlreadyActive` if another cycle is still running
    /// - `DuplicateId` if the id is already in the history
    /// - `NotRunning` if the cycle already carries an outcome
    pub fn add_cycle(&self, cycle: Cycle) -> Result<Self, CycleStoreError> {
        if let Some(active) = self.active_cycle() {
            return Err(CycleStoreError::AlreadyActive(active.id()));
        }
        if self.find(cycle.id()).is_some() {
            return Err(CycleStoreError::DuplicateId(cycle.id()));
        }
        if !cycle.is_running() {
            return Err(CycleStoreError::NotRunning(cycle.id()));
        }

        let mut cycles = self.cycles.clone();
        let active_cycle_id = Some(cycle.id());
        cycles.push(cycle);

        Ok(Self {
            cycles,
            active_cycle_id,
        })
    }

    /// Marks the active cycle completed. No-op without an active cycle.
    pub fn complete_active(&self, at: Timestamp) -> Self {
        self.finish_active(|cycle| cycle.complete(at).ok())
    }

    /// Marks the active cycle interrupted. No-op without an active cycle.
    pub fn interrupt_active(&self, at: Timestamp) -> Self {
        self.finish_active(|cycle| cycle.interrupt(at).ok())
    }

    /// Dispatches an action to the matching transition.
    pub fn apply(&self, action: CycleAction, at: Timestamp) -> Result<Self, CycleStoreError> {
        match action {
            CycleAction::AddCycle(cycle) => self.add_cycle(cycle),
            CycleAction::CompleteActive => Ok(self.complete_active(at)),
            CycleAction::InterruptActive => Ok(self.interrupt_active(at)),
        }
    }

    fn finish_active(&self, finish: impl FnOnce(&Cycle) -> Option<Cycle>) -> Self {
        let Some(active_id) = self.active_cycle_id else {
            return self.clone();
        };
        let Some(index) = self.cycles.iter().position(|c| c.id() == active_id) else {
            return self.clone();
        };
        let Some(finished) = finish(&self.cycles[index]) else {
            return self.clone();
        };

        let mut cycles = self.cycles.clone();
        cycles[index] = finished;

        Self {
            cycles,
            active_cycle_id: None,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Invariants
    // ───────────────────────────────────────────────────────────────

    /// Checks every structural invariant of the snapshot.
    ///
    /// Transitions always preserve these; this exists for snapshots that
    /// come from outside, such as persisted state.
    pub fn validate(&self) -> Result<(), CycleStoreError> {
        let mut seen = std::collections::HashSet::new();
        for cycle in &self.cycles {
            if !seen.insert(cycle.id()) {
                return Err(CycleStoreError::DuplicateId(cycle.id()));
            }
            if cycle.has_conflicting_outcome() {
                return Err(CycleStoreError::ConflictingOutcome(cycle.id()));
            }
            if cycle.is_running() && Some(cycle.id()) != self.active_cycle_id {
                return Err(CycleStoreError::OrphanedRunning(cycle.id()));
            }
        }

        if let Some(active_id) = self.active_cycle_id {
            match self.find(active_id) {
                None => return Err(CycleStoreError::DanglingActive(active_id)),
                Some(cycle) if !cycle.is_running() => {
                    return Err(CycleStoreError::ActiveNotRunning(active_id))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}
