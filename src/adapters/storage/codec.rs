//! JSON encoding of the persisted cycle store.
//!
//! Record shape:
//!
//! ```json
//! {
//!   "cycles": [
//!     { "id": "…", "task": "Write report", "plannedMinutes": 25,
//!       "createdAt": "2023-11-14T22:13:20Z",
//!       "completedAt": "2023-11-14T22:38:20Z" }
//!   ],
//!   "activeCycleId": null
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::cycle::{Cycle, CycleStore};
use crate::domain::foundation::{CycleId, Timestamp};
use crate::ports::StorageError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRecord {
    #[serde(default)]
    cycles: Vec<CycleRecord>,
    #[serde(default)]
    active_cycle_id: Option<CycleId>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CycleRecord {
    id: CycleId,
    task: String,
    planned_minutes: u32,
    created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interrupted_at: Option<Timestamp>,
}

impl From<&Cycle> for CycleRecord {
    fn from(cycle: &Cycle) -> Self {
        Self {
            id: cycle.id(),
            task: cycle.task().to_string(),
            planned_minutes: cycle.planned_minutes(),
            created_at: cycle.created_at(),
            completed_at: cycle.completed_at(),
            interrupted_at: cycle.interrupted_at(),
        }
    }
}

impl From<CycleRecord> for Cycle {
    fn from(record: CycleRecord) -> Self {
        Cycle::reconstitute(
            record.id,
            record.task,
            record.planned_minutes,
            record.created_at,
            record.completed_at,
            record.interrupted_at,
        )
    }
}

/// Encodes a store snapshot as JSON.
pub fn encode(store: &CycleStore) -> Result<String, StorageError> {
    let record = SnapshotRecord {
        cycles: store.cycles().iter().map(CycleRecord::from).collect(),
        active_cycle_id: store.active_cycle_id(),
    };
    serde_json::to_string_pretty(&record)
        .map_err(|e| StorageError::SerializationFailed(e.to_string()))
}

/// Decodes a store snapshot from JSON.
///
/// Only the format is checked here; store invariants are the caller's job.
pub fn decode(json: &str) -> Result<CycleStore, StorageError> {
    let record: SnapshotRecord = serde_json::from_str(json)
        .map_err(|e| StorageError::DeserializationFailed(e.to_string()))?;

    Ok(CycleStore::reconstitute(
        record.cycles.into_iter().map(Cycle::from).collect(),
        record.active_cycle_id,
    ))
}
