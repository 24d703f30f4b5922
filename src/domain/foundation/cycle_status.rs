//! CycleStatus enum for tracking the lifecycle of work cycles.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of a work cycle.
///
/// Never stored: it is derived from a cycle's `completed_at` and
/// `interrupted_at` timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    #[default]
    Running,
    Completed,
    Interrupted,
}

impl StateMachine for CycleStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CycleStatus::*;
        matches!((self, target), (Running, Completed) | (Running, Interrupted))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CycleStatus::*;
        match self {
            Running => vec![Completed, Interrupted],
            Completed | Interrupted => vec![],
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CycleStatus::Running => "In progress",
            CycleStatus::Completed => "Completed",
            CycleStatus::Interrupted => "Interrupted",
        };
        write!(f, "{}", s)
    }
}
