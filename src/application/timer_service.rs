//! CycleTimerService - background task that owns the facade and drives ticks.
//!
//! The service is the only owner of the `CycleFacade`. Callers talk to it
//! through a cloneable `CycleTimerHandle`, which sends commands over a
//! channel and reads views from the facade's `watch` channel. Because a
//! single task applies every transition, no locking is needed around the
//! store.
//!
//! ## Ticking
//!
//! While a cycle is active the service ticks once per `tick_interval`. The
//! schedule is rebuilt on every transition and remembers which cycle it was
//! built for. A tick that fires for a cycle that is no longer active is
//! dropped.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `tick_interval` | 1s | How often elapsed time is reconciled |
//! | `app_name` | Work Cycles | Suffix of the window title |
//! | `command_buffer` | 32 | Pending commands before senders wait |
//!
//! ## Graceful Shutdown
//!
//! On the shutdown signal, or once every handle is dropped, the service
//! retries a write that failed, resets the window title, and returns the
//! facade from its join handle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::domain::cycle::{window_title, CycleView};
use crate::domain::foundation::CycleId;
use crate::ports::TitleSink;

use super::{CreateCycleCommand, CycleError, CycleFacade, TickOutcome};

/// Configuration for the CycleTimerService.
#[derive(Debug, Clone)]
pub struct TimerServiceConfig {
    /// How often elapsed time is reconciled while a cycle runs.
    pub tick_interval: Duration,

    /// Application name shown in the window title.
    pub app_name: String,

    /// Capacity of the command channel.
    pub command_buffer: usize,
}

impl Default for TimerServiceConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            app_name: "Work Cycles".to_string(),
            command_buffer: 32,
        }
    }
}

impl TimerServiceConfig {
    /// Create config with custom tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Create config with custom application name.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }
}

/// Errors returned through a `CycleTimerHandle`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerServiceError {
    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("Cycle timer has stopped")]
    Stopped,
}

enum CycleCommand {
    Create {
        cmd: CreateCycleCommand,
        reply: oneshot::Sender<Result<CycleId, CycleError>>,
    },
    Interrupt {
        reply: oneshot::Sender<Option<CycleId>>,
    },
}

/// Cloneable handle for talking to a running `CycleTimerService`.
#[derive(Clone)]
pub struct CycleTimerHandle {
    commands: mpsc::Sender<CycleCommand>,
    views: watch::Receiver<CycleView>,
}

impl CycleTimerHandle {
    /// Starts a new cycle.
    pub async fn create_cycle(&self, cmd: CreateCycleCommand) -> Result<CycleId, TimerServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(CycleCommand::Create { cmd, reply }).await?;
        Ok(response.await.map_err(|_| TimerServiceError::Stopped)??)
    }

    /// Interrupts the active cycle, returning its id if there was one.
    pub async fn interrupt_active_cycle(&self) -> Result<Option<CycleId>, TimerServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(CycleCommand::Interrupt { reply }).await?;
        response.await.map_err(|_| TimerServiceError::Stopped)
    }

    /// The most recently published view.
    pub fn current_view(&self) -> CycleView {
        self.views.borrow().clone()
    }

    /// Receiver notified on every published view.
    pub fn subscribe(&self) -> watch::Receiver<CycleView> {
        self.views.clone()
    }

    async fn send(&self, command: CycleCommand) -> Result<(), TimerServiceError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| TimerServiceError::Stopped)
    }
}

struct TickSchedule {
    cycle_id: CycleId,
    interval: Interval,
}

/// Background service that owns the facade.
pub struct CycleTimerService {
    facade: CycleFacade,
    title: Arc<dyn TitleSink>,
    config: TimerServiceConfig,
    schedule: Option<TickSchedule>,
    last_title: Option<String>,
}

impl CycleTimerService {
    /// Create a new service with default configuration.
    pub fn new(facade: CycleFacade, title: Arc<dyn TitleSink>) -> Self {
        Self::with_config(facade, title, TimerServiceConfig::default())
    }

    /// Create a new service with custom configuration.
    pub fn with_config(
        facade: CycleFacade,
        title: Arc<dyn TitleSink>,
        config: TimerServiceConfig,
    ) -> Self {
        Self {
            facade,
            title,
            config,
            schedule: None,
            last_title: None,
        }
    }

    /// Spawns the service onto the runtime.
    ///
    /// The join handle yields the facade once the service has stopped.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> (CycleTimerHandle, JoinHandle<CycleFacade>) {
        let (commands, receiver) = mpsc::channel(self.config.command_buffer.max(1));
        let handle = CycleTimerHandle {
            commands,
            views: self.facade.subscribe(),
        };
        let task = tokio::spawn(self.run(receiver, shutdown));
        (handle, task)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<CycleCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) -> CycleFacade {
        self.reschedule();
        self.refresh_title();
        info!(
            tick_ms = self.config.tick_interval.as_millis() as u64,
            active = ?self.facade.store().active_cycle_id(),
            "Cycle timer started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },

                cycle_id = next_tick(&mut self.schedule) => {
                    self.on_tick(cycle_id).await;
                }
            }
            self.refresh_title();
        }

        self.schedule = None;
        self.facade.flush().await;
        let app_name = self.config.app_name.clone();
        self.set_title(&app_name);
        info!("Cycle timer stopped");
        self.facade
    }

    async fn handle(&mut self, command: CycleCommand) {
        match command {
            CycleCommand::Create { cmd, reply } => {
                let result = self.facade.create_cycle(cmd).await;
                if result.is_ok() {
                    self.reschedule();
                }
                let _ = reply.send(result);
            }
            CycleCommand::Interrupt { reply } => {
                let interrupted = self.facade.interrupt_active_cycle().await;
                if interrupted.is_some() {
                    self.reschedule();
                }
                let _ = reply.send(interrupted);
            }
        }
    }

    async fn on_tick(&mut self, scheduled_for: CycleId) {
        if self.facade.store().active_cycle_id() != Some(scheduled_for) {
            debug!(cycle_id = %scheduled_for, "Dropping tick for a cycle that is no longer active");
            self.reschedule();
            return;
        }

        if let TickOutcome::Completed(cycle_id) = self.facade.tick().await {
            debug!(cycle_id = %cycle_id, "Planned duration elapsed");
            self.reschedule();
        }
    }

    /// Replaces the tick schedule to match the current active cycle.
    fn reschedule(&mut self) {
        let period = self.config.tick_interval.max(Duration::from_millis(1));
        self.schedule = self.facade.store().active_cycle_id().map(|cycle_id| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            TickSchedule { cycle_id, interval }
        });
    }

    fn refresh_title(&mut self) {
        let title = window_title(&self.config.app_name, self.facade.countdown());
        if self.last_title.as_deref() != Some(title.as_str()) {
            self.set_title(&title);
        }
    }

    fn set_title(&mut self, title: &str) {
        if let Err(e) = self.title.set_title(title) {
            debug!(error = %e, "Failed to update window title");
        }
        self.last_title = Some(title.to_string());
    }
}

/// Waits for the next scheduled tick, or forever when nothing is scheduled.
async fn next_tick(schedule: &mut Option<TickSchedule>) -> CycleId {
    match schedule {
        Some(schedule) => {
            schedule.interval.tick().await;
            schedule.cycle_id
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySnapshotStorage, ManualClock, RecordingTitle};
    use crate::domain::foundation::{CycleStatus, Timestamp};

    const T0: i64 = 1_700_000_000_000;

    struct Harness {
        storage: InMemorySnapshotStorage,
        clock: ManualClock,
        titles: RecordingTitle,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                storage: InMemorySnapshotStorage::new(),
                clock: ManualClock::new(Timestamp::from_millis(T0).unwrap()),
                titles: RecordingTitle::new(),
            }
        }

        async fn service(&self) -> CycleTimerService {
            let facade =
                CycleFacade::load(Arc::new(self.storage.clone()), Arc::new(self.clock.clone()))
                    .await;
            let config = TimerServiceConfig::default().with_tick_interval(Duration::from_millis(10));
            CycleTimerService::with_config(facade, Arc::new(self.titles.clone()), config)
        }
    }

    async fn wait_for(
        views: &mut watch::Receiver<CycleView>,
        predicate: impl Fn(&CycleView) -> bool,
    ) -> CycleView {
        let waited = time::timeout(Duration::from_secs(2), async {
            loop {
                {
                    let view = views.borrow_and_update();
                    if predicate(&view) {
                        return view.clone();
                    }
                }
                views.changed().await.unwrap();
            }
        })
        .await;
        waited.expect("view never matched")
    }

    #[tokio::test]
    async fn ticks_until_cycle_completes() {
        let harness = Harness::new();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, _task) = harness.service().await.spawn(shutdown_rx);
        let mut views = handle.subscribe();

        let id = handle
            .create_cycle(CreateCycleCommand::new("Write report", 1))
            .await
            .unwrap();

        harness.clock.advance_secs(5);
        let view = wait_for(&mut views, |v| v.seconds_passed == 5).await;
        assert_eq!(view.countdown().unwrap().to_string(), "00:55");

        harness.clock.advance_secs(55);
        let view = wait_for(&mut views, |v| v.active_cycle.is_none()).await;
        assert_eq!(view.cycles[0].id(), id);
        assert_eq!(view.cycles[0].status(), CycleStatus::Completed);
    }

    #[tokio::test]
    async fn window_title_follows_countdown() {
        let harness = Harness::new();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, _task) = harness.service().await.spawn(shutdown_rx);
        let mut views = handle.subscribe();

        handle
            .create_cycle(CreateCycleCommand::new("Write report", 25))
            .await
            .unwrap();
        harness.clock.advance_secs(5);
        wait_for(&mut views, |v| v.seconds_passed == 5).await;
        time::sleep(Duration::from_millis(30)).await;

        assert_eq!(harness.titles.last().as_deref(), Some("24:55 | Work Cycles"));

        handle.interrupt_active_cycle().await.unwrap();
        time::sleep(Duration::from_millis(30)).await;

        assert_eq!(harness.titles.last().as_deref(), Some("Work Cycles"));
    }

    #[tokio::test]
    async fn title_is_only_pushed_when_it_changes() {
        let harness = Harness::new();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, _task) = harness.service().await.spawn(shutdown_rx);

        handle
            .create_cycle(CreateCycleCommand::new("A", 25))
            .await
            .unwrap();
        time::sleep(Duration::from_millis(100)).await;

        let titles = harness.titles.titles();
        assert_eq!(titles, vec!["Work Cycles", "25:00 | Work Cycles"]);
    }

    #[tokio::test]
    async fn second_create_is_rejected_through_handle() {
        let harness = Harness::new();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, _task) = harness.service().await.spawn(shutdown_rx);

        let first = handle
            .create_cycle(CreateCycleCommand::new("A", 25))
            .await
            .unwrap();
        let err = handle
            .create_cycle(CreateCycleCommand::new("B", 25))
            .await
            .unwrap_err();

        assert_eq!(err, TimerServiceError::Cycle(CycleError::AlreadyActive(first)));
    }

    #[tokio::test]
    async fn interrupted_cycle_is_never_completed_later() {
        let harness = Harness::new();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, _task) = harness.service().await.spawn(shutdown_rx);

        let id = handle
            .create_cycle(CreateCycleCommand::new("A", 5))
            .await
            .unwrap();
        assert_eq!(handle.interrupt_active_cycle().await.unwrap(), Some(id));

        harness.clock.advance_secs(600);
        time::sleep(Duration::from_millis(50)).await;

        let view = handle.current_view();
        assert_eq!(view.cycles[0].status(), CycleStatus::Interrupted);
        assert_eq!(handle.interrupt_active_cycle().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clean_shutdown_leaves_snapshot_alone_and_resets_title() {
        let harness = Harness::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, task) = harness.service().await.spawn(shutdown_rx);

        handle
            .create_cycle(CreateCycleCommand::new("A", 25))
            .await
            .unwrap();
        let saves_before = harness.storage.save_count();

        shutdown_tx.send(true).unwrap();
        let facade = task.await.unwrap();

        assert_eq!(harness.storage.save_count(), saves_before);
        assert!(facade.store().active_cycle_id().is_some());
        assert_eq!(harness.titles.last().as_deref(), Some("Work Cycles"));
        assert_eq!(
            handle
                .create_cycle(CreateCycleCommand::new("B", 25))
                .await
                .unwrap_err(),
            TimerServiceError::Stopped
        );
    }

    #[tokio::test]
    async fn shutdown_retries_a_failed_write() {
        let harness = Harness::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, task) = harness.service().await.spawn(shutdown_rx);

        harness.storage.set_fail_writes(true);
        handle
            .create_cycle(CreateCycleCommand::new("A", 25))
            .await
            .unwrap();
        harness.storage.set_fail_writes(false);

        shutdown_tx.send(true).unwrap();
        let facade = task.await.unwrap();

        assert_eq!(harness.storage.save_count(), 1);
        assert_eq!(facade.consecutive_save_failures(), 0);
    }

    #[tokio::test]
    async fn stops_when_every_handle_is_dropped() {
        let harness = Harness::new();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, task) = harness.service().await.spawn(shutdown_rx);

        drop(handle);

        let stopped = time::timeout(Duration::from_secs(2), task).await;
        assert!(stopped.is_ok());
    }

    #[tokio::test]
    async fn stale_tick_does_not_touch_the_new_cycle() {
        let harness = Harness::new();
        let mut service = harness.service().await;

        let (reply, response) = oneshot::channel();
        service
            .handle(CycleCommand::Create {
                cmd: CreateCycleCommand::new("A", 5),
                reply,
            })
            .await;
        let first = response.await.unwrap().unwrap();

        let (reply, _response) = oneshot::channel();
        service.handle(CycleCommand::Interrupt { reply }).await;

        let (reply, response) = oneshot::channel();
        service
            .handle(CycleCommand::Create {
                cmd: CreateCycleCommand::new("B", 5),
                reply,
            })
            .await;
        let second = response.await.unwrap().unwrap();
        assert_eq!(service.schedule.as_ref().map(|s| s.cycle_id), Some(second));

        harness.clock.advance_secs(600);
        service.on_tick(first).await;

        assert_eq!(service.facade.store().active_cycle_id(), Some(second));
        assert_eq!(service.schedule.as_ref().map(|s| s.cycle_id), Some(second));
    }

    #[tokio::test]
    async fn schedule_is_cleared_when_idle() {
        let harness = Harness::new();
        let mut service = harness.service().await;
        service.reschedule();
        assert!(service.schedule.is_none());

        let (reply, response) = oneshot::channel();
        service
            .handle(CycleCommand::Create {
                cmd: CreateCycleCommand::new("A", 1),
                reply,
            })
            .await;
        let id = response.await.unwrap().unwrap();
        assert!(service.schedule.is_some());

        harness.clock.advance_secs(60);
        service.on_tick(id).await;

        assert!(service.schedule.is_none());
        assert!(service.facade.store().active_cycle_id().is_none());
    }
}
