//! Elapsed-time reconciliation.
//!
//! Elapsed time is always recomputed from the cycle's start instant and the
//! current wall clock. Nothing accumulates between ticks, so a suspended or
//! throttled process catches up on its first tick after resuming.

use crate::domain::foundation::{CycleId, Timestamp};

use super::Cycle;

/// What a reconciliation pass concluded about the active cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// No cycle is running.
    Idle,
    /// The cycle is still within its planned duration.
    Running { seconds_passed: u64 },
    /// The planned duration has elapsed; the cycle should complete.
    Due { cycle_id: CycleId },
}

/// Whole seconds elapsed from `started_at` to `now`, floored and clamped at 0.
///
/// A clock that moved backwards yields 0 rather than a negative value.
pub fn elapsed_seconds(started_at: Timestamp, now: Timestamp) -> u64 {
    let millis = now.duration_since(&started_at).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis / 1000) as u64
    }
}

/// Reconciles the active cycle against `now`.
pub fn reconcile(active: Option<&Cycle>, now: Timestamp) -> Reconciliation {
    let Some(cycle) = active else {
        return Reconciliation::Idle;
    };

    let seconds_passed = elapsed_seconds(cycle.created_at(), now);
    if seconds_passed >= cycle.planned_seconds() {
        Reconciliation::Due {
            cycle_id: cycle.id(),
        }
    } else {
        Reconciliation::Running { seconds_passed }
    }
}
