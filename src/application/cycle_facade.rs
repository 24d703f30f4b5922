//! CycleFacade - the single entry point for reading and changing cycles.
//!
//! The facade owns the in-memory `CycleStore`, the transient elapsed
//! seconds, and the write-through persistence of the store.
//!
//! ## Persistence
//!
//! The snapshot is loaded once, when the facade is built. Every committed
//! transition is written back. A failed write is logged and counted but
//! never surfaced, since the in-memory store stays authoritative. `flush`
//! only retries a failed write.
//!
//! ## Observers
//!
//! Readers subscribe to a `watch` channel of `CycleView`. A new view is
//! published after every committed transition and whenever a tick changes
//! the elapsed seconds. Store and elapsed seconds always change together.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::domain::cycle::{
    reconcile, Countdown, Cycle, CycleStore, CycleStoreError, CycleView, Reconciliation,
};
use crate::domain::foundation::{CycleId, Timestamp, ValidationError};
use crate::ports::{Clock, SnapshotStorage};

use super::CreateCycleCommand;

const CREATED_AT_JITTER_MS: i64 = 1_000;

/// Errors returned by facade operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    /// A cycle is already running. Interrupt it before starting another.
    #[error("Cycle {0} is still running")]
    AlreadyActive(CycleId),

    #[error("Invalid cycle input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error(transparent)]
    Store(CycleStoreError),
}

impl From<CycleStoreError> for CycleError {
    fn from(err: CycleStoreError) -> Self {
        match err {
            CycleStoreError::AlreadyActive(id) => CycleError::AlreadyActive(id),
            other => CycleError::Store(other),
        }
    }
}

/// Result of a single reconciliation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No active cycle.
    Idle,
    /// Active cycle still running.
    Running { seconds_passed: u64 },
    /// The active cycle reached its planned duration and was completed.
    Completed(CycleId),
}

/// Facade over the cycle store and its persistence.
pub struct CycleFacade {
    store: CycleStore,
    seconds_passed: u64,
    storage: Arc<dyn SnapshotStorage>,
    clock: Arc<dyn Clock>,
    views: watch::Sender<CycleView>,
    consecutive_save_failures: u32,
}

impl CycleFacade {
    /// Loads the persisted snapshot and reconciles it against the clock.
    ///
    /// A missing, unreadable, or inconsistent snapshot yields an empty store.
    /// An active cycle whose planned duration already elapsed is completed
    /// before this returns.
    pub async fn load(storage: Arc<dyn SnapshotStorage>, clock: Arc<dyn Clock>) -> Self {
        let store = hydrate(storage.as_ref()).await;
        let (views, _) = watch::channel(CycleView::new(&store, 0));

        let mut facade = Self {
            store,
            seconds_passed: 0,
            storage,
            clock,
            views,
            consecutive_save_failures: 0,
        };
        facade.tick().await;
        facade
    }

    // ───────────────────────────────────────────────────────────────
    // Operations
    // ───────────────────────────────────────────────────────────────

    /// Starts a new cycle and makes it active.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the task is blank or the duration is zero
    /// - `AlreadyActive` if a cycle is still running
    pub async fn create_cycle(&mut self, cmd: CreateCycleCommand) -> Result<CycleId, CycleError> {
        cmd.ensure_well_formed()?;

        let cycle = Cycle::new(
            CycleId::new(),
            cmd.task.trim(),
            cmd.planned_minutes,
            self.next_created_at(),
        );
        let cycle_id = cycle.id();
        let store = self.store.add_cycle(cycle)?;

        info!(
            cycle_id = %cycle_id,
            planned_minutes = cmd.planned_minutes,
            "Cycle started"
        );
        self.commit(store, 0).await;
        Ok(cycle_id)
    }

    /// Interrupts the active cycle, if any.
    ///
    /// Returns the interrupted cycle's id. Without an active cycle nothing
    /// changes and nothing is written.
    pub async fn interrupt_active_cycle(&mut self) -> Option<CycleId> {
        let cycle_id = self.store.active_cycle_id()?;
        let store = self.store.interrupt_active(self.clock.now());

        info!(cycle_id = %cycle_id, seconds_passed = self.seconds_passed, "Cycle interrupted");
        self.commit(store, 0).await;
        Some(cycle_id)
    }

    /// Completes the active cycle, if any.
    pub async fn complete_active_cycle(&mut self) -> Option<CycleId> {
        let cycle_id = self.store.active_cycle_id()?;
        let store = self.store.complete_active(self.clock.now());

        info!(cycle_id = %cycle_id, "Cycle completed");
        self.commit(store, 0).await;
        Some(cycle_id)
    }

    /// Recomputes elapsed time from the clock and completes a due cycle.
    pub async fn tick(&mut self) -> TickOutcome {
        match reconcile(self.store.active_cycle(), self.clock.now()) {
            Reconciliation::Idle => TickOutcome::Idle,
            Reconciliation::Running { seconds_passed } => {
                trace!(seconds_passed, "Tick");
                if seconds_passed != self.seconds_passed {
                    self.seconds_passed = seconds_passed;
                    self.publish();
                }
                TickOutcome::Running { seconds_passed }
            }
            Reconciliation::Due { cycle_id } => {
                self.complete_active_cycle().await;
                TickOutcome::Completed(cycle_id)
            }
        }
    }

    /// Retries the last write if it failed. Used at teardown.
    ///
    /// After a clean write-through the snapshot may have been changed by
    /// another process since, so nothing is written.
    pub async fn flush(&mut self) {
        if self.consecutive_save_failures > 0 {
            self.persist().await;
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Queries
    // ───────────────────────────────────────────────────────────────

    /// Snapshot of the current state.
    pub fn current_view(&self) -> CycleView {
        CycleView::new(&self.store, self.seconds_passed)
    }

    /// Receiver that observes every published view.
    pub fn subscribe(&self) -> watch::Receiver<CycleView> {
        self.views.subscribe()
    }

    pub fn store(&self) -> &CycleStore {
        &self.store
    }

    pub fn seconds_passed(&self) -> u64 {
        self.seconds_passed
    }

    /// Remaining time of the active cycle.
    pub fn countdown(&self) -> Option<Countdown> {
        self.store
            .active_cycle()
            .map(|cycle| Countdown::new(cycle.planned_seconds(), self.seconds_passed))
    }

    /// Number of saves that failed since the last successful one.
    pub fn consecutive_save_failures(&self) -> u32 {
        self.consecutive_save_failures
    }

    // ───────────────────────────────────────────────────────────────
    // Internals
    // ───────────────────────────────────────────────────────────────

    /// Stamps the real start instant. Only a clock that repeats or jitters
    /// back by at most `CREATED_AT_JITTER_MS` is nudged past the latest
    /// creation instant; a larger backward step keeps `now`.
    fn next_created_at(&self) -> Timestamp {
        let now = self.clock.now();
        match self.store.latest_created_at() {
            Some(latest)
                if !now.is_after(&latest)
                    && latest.duration_since(&now).num_milliseconds() <= CREATED_AT_JITTER_MS =>
            {
                latest.plus_millis(1)
            }
            _ => now,
        }
    }

    async fn commit(&mut self, store: CycleStore, seconds_passed: u64) {
        self.store = store;
        self.seconds_passed = seconds_passed;
        self.publish();
        self.persist().await;
    }

    fn publish(&self) {
        self.views.send_replace(self.current_view());
    }

    async fn persist(&mut self) {
        match self.storage.save(&self.store).await {
            Ok(()) => self.consecutive_save_failures = 0,
            Err(e) => {
                self.consecutive_save_failures += 1;
                warn!(
                    error = %e,
                    consecutive_failures = self.consecutive_save_failures,
                    "Failed to persist cycles, keeping in-memory state"
                );
            }
        }
    }
}

async fn hydrate(storage: &dyn SnapshotStorage) -> CycleStore {
    match storage.load().await {
        Ok(Some(store)) => match store.validate() {
            Ok(()) => {
                debug!(
                    cycles = store.len(),
                    active = ?store.active_cycle_id(),
                    "Restored persisted cycles"
                );
                store
            }
            Err(e) => {
                warn!(error = %e, "Persisted cycles are inconsistent, starting empty");
                CycleStore::new()
            }
        },
        Ok(None) => {
            debug!("No persisted cycles, starting empty");
            CycleStore::new()
        }
        Err(e) => {
            warn!(error = %e, "Failed to load persisted cycles, starting empty");
            CycleStore::new()
        }
    }
}
