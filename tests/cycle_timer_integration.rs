//! Integration tests for the cycle timer.
//!
//! These tests verify the end-to-end flow:
//! 1. A cycle is started through the timer handle
//! 2. The service reconciles elapsed time and completes the cycle on its own
//! 3. Every transition lands in the snapshot file
//! 4. A restarted process restores the history and the running cycle
//!
//! Uses the file adapter in a temp directory and a manual clock.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

use work_cycles::adapters::{FileSnapshotStorage, ManualClock, RecordingTitle};
use work_cycles::application::{
    CreateCycleCommand, CycleError, CycleFacade, CycleTimerService, TimerServiceConfig,
    TimerServiceError,
};
use work_cycles::domain::cycle::{CycleStore, CycleView};
use work_cycles::domain::foundation::{CycleStatus, Timestamp};
use work_cycles::ports::{SnapshotStorage, StorageError};

const T0: i64 = 1_700_000_000_000;

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Storage that never succeeds
struct BrokenStorage {
    attempts: AtomicUsize,
}

#[async_trait]
impl SnapshotStorage for BrokenStorage {
    async fn load(&self) -> Result<Option<CycleStore>, StorageError> {
        Err(StorageError::IoError("disk unavailable".to_string()))
    }

    async fn save(&self, _store: &CycleStore) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::IoError("disk unavailable".to_string()))
    }
}

fn service_config() -> TimerServiceConfig {
    TimerServiceConfig::default()
        .with_tick_interval(Duration::from_millis(10))
        .with_app_name("Work Cycles")
}

async fn start_service(
    storage: Arc<dyn SnapshotStorage>,
    clock: &ManualClock,
    titles: &RecordingTitle,
) -> (
    work_cycles::application::CycleTimerHandle,
    tokio::task::JoinHandle<CycleFacade>,
    watch::Sender<bool>,
) {
    let facade = CycleFacade::load(storage, Arc::new(clock.clone())).await;
    let service = CycleTimerService::with_config(facade, Arc::new(titles.clone()), service_config());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (handle, task) = service.spawn(shutdown_rx);
    (handle, task, shutdown_tx)
}

async fn wait_for(
    views: &mut watch::Receiver<CycleView>,
    predicate: impl Fn(&CycleView) -> bool,
) -> CycleView {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            {
                let view = views.borrow_and_update();
                if predicate(&view) {
                    return view.clone();
                }
            }
            views.changed().await.expect("timer stopped");
        }
    })
    .await
    .expect("view never matched")
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn cycle_runs_to_completion_and_survives_restart() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(Timestamp::from_millis(T0).unwrap());
    let titles = RecordingTitle::new();
    let storage = Arc::new(FileSnapshotStorage::new(dir.path()));

    let (handle, task, shutdown) = start_service(storage.clone(), &clock, &titles).await;
    let mut views = handle.subscribe();

    let first = handle
        .create_cycle(CreateCycleCommand::new("Write report", 25))
        .await
        .unwrap();
    let view = handle.current_view();
    assert_eq!(view.active_cycle.as_ref().unwrap().task(), "Write report");
    assert_eq!(view.seconds_passed, 0);

    clock.advance_millis(5_000);
    wait_for(&mut views, |v| v.seconds_passed == 5).await;

    clock.set(Timestamp::from_millis(T0).unwrap().plus_secs(1500));
    let view = wait_for(&mut views, |v| v.active_cycle.is_none()).await;
    assert_eq!(view.cycles[0].status(), CycleStatus::Completed);

    clock.advance_secs(60);
    let second = handle
        .create_cycle(CreateCycleCommand::new("Review PR", 15))
        .await
        .unwrap();

    shutdown.send(true).unwrap();
    task.await.unwrap();
    assert_eq!(titles.last().as_deref(), Some("Work Cycles"));

    // Restart ten minutes into the second cycle
    clock.advance_secs(600);
    let restored = CycleFacade::load(storage, Arc::new(clock.clone())).await;

    assert_eq!(restored.store().len(), 2);
    assert_eq!(restored.store().cycles()[0].id(), first);
    assert_eq!(restored.store().active_cycle_id(), Some(second));
    assert_eq!(restored.seconds_passed(), 600);
    assert_eq!(restored.countdown().unwrap().to_string(), "05:00");
}

#[tokio::test]
async fn snapshot_file_uses_documented_layout() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(Timestamp::from_millis(T0).unwrap());
    let storage = Arc::new(FileSnapshotStorage::new(dir.path()));

    let mut facade = CycleFacade::load(storage.clone(), Arc::new(clock.clone())).await;
    let id = facade
        .create_cycle(CreateCycleCommand::new("Write report", 25))
        .await
        .unwrap();

    let raw = std::fs::read_to_string(storage.snapshot_path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert!(storage.snapshot_path().ends_with("cycles-state_1.0.0.json"));
    assert_eq!(json["activeCycleId"], id.to_string());
    assert_eq!(json["cycles"][0]["task"], "Write report");
    assert_eq!(json["cycles"][0]["plannedMinutes"], 25);
    assert_eq!(json["cycles"][0]["createdAt"], "2023-11-14T22:13:20Z");
    assert!(json["cycles"][0].get("completedAt").is_none());
}

#[tokio::test]
async fn corrupt_snapshot_file_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSnapshotStorage::new(dir.path()));
    std::fs::write(storage.snapshot_path(), "definitely not json").unwrap();
    let clock = ManualClock::new(Timestamp::from_millis(T0).unwrap());

    let mut facade = CycleFacade::load(storage.clone(), Arc::new(clock)).await;
    assert!(facade.store().is_empty());

    facade
        .create_cycle(CreateCycleCommand::new("Fresh start", 25))
        .await
        .unwrap();
    let reloaded = storage.load().await.unwrap().unwrap();
    assert_eq!(reloaded.len(), 1);
}

#[tokio::test]
async fn broken_storage_never_blocks_the_timer() {
    let storage = Arc::new(BrokenStorage {
        attempts: AtomicUsize::new(0),
    });
    let clock = ManualClock::new(Timestamp::from_millis(T0).unwrap());
    let titles = RecordingTitle::new();

    let (handle, task, shutdown) = start_service(storage.clone(), &clock, &titles).await;
    let mut views = handle.subscribe();

    let id = handle
        .create_cycle(CreateCycleCommand::new("Offline", 5))
        .await
        .unwrap();
    let err = handle
        .create_cycle(CreateCycleCommand::new("Second", 5))
        .await
        .unwrap_err();
    assert_eq!(err, TimerServiceError::Cycle(CycleError::AlreadyActive(id)));

    clock.advance_secs(300);
    let view = wait_for(&mut views, |v| v.active_cycle.is_none()).await;
    assert_eq!(view.cycles[0].status(), CycleStatus::Completed);

    shutdown.send(true).unwrap();
    let facade = task.await.unwrap();
    assert!(facade.consecutive_save_failures() >= 2);
    assert!(storage.attempts.load(Ordering::SeqCst) >= 2);
}
