//! CycleView value object - what readers of the timer observe.
//!
//! A read-only snapshot combining the store contents with the transient
//! elapsed seconds, plus the derived countdown and history rows.

use crate::domain::foundation::{CycleId, CycleStatus, Timestamp};

use super::{Countdown, Cycle, CycleStore};

/// Snapshot of the timer state at one moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleView {
    pub active_cycle: Option<Cycle>,
    pub cycles: Vec<Cycle>,
    pub seconds_passed: u64,
}

/// One row of the cycle history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: CycleId,
    pub task: String,
    pub planned_minutes: u32,
    pub started_at: Timestamp,
    pub status: CycleStatus,
}

impl CycleView {
    /// Builds a view from a store snapshot and the current elapsed seconds.
    pub fn new(store: &CycleStore, seconds_passed: u64) -> Self {
        Self {
            active_cycle: store.active_cycle().cloned(),
            cycles: store.cycles().to_vec(),
            seconds_passed,
        }
    }

    /// Remaining time of the active cycle.
    pub fn countdown(&self) -> Option<Countdown> {
        self.active_cycle
            .as_ref()
            .map(|cycle| Countdown::new(cycle.planned_seconds(), self.seconds_passed))
    }

    /// History rows, most recent first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.cycles
            .iter()
            .rev()
            .map(|cycle| HistoryEntry {
                id: cycle.id(),
                task: cycle.task().to_string(),
                planned_minutes: cycle.planned_minutes(),
                started_at: cycle.created_at(),
                status: cycle.status(),
            })
            .collect()
    }
}
