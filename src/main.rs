//! `work-cycles` - run timed work cycles from the terminal.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use work_cycles::adapters::{FileSnapshotStorage, SystemClock, TerminalTitle};
use work_cycles::application::{
    CreateCycleCommand, CycleFacade, CycleTimerHandle, CycleTimerService, TimerServiceError,
};
use work_cycles::config::{AppConfig, ConfigError, LoggingConfig};
use work_cycles::domain::cycle::CycleView;
use work_cycles::domain::foundation::{CycleId, ValidationError};

#[derive(Parser)]
#[command(name = "work-cycles", version, about = "Timed work cycles with a persisted countdown")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a cycle and follow its countdown. Ctrl-C interrupts it.
    Start {
        /// What you are working on
        task: String,
        /// Planned duration in minutes
        #[arg(short, long)]
        minutes: Option<u32>,
    },
    /// Follow a cycle started by an earlier invocation
    Resume,
    /// Show the running cycle and its remaining time
    Status,
    /// Interrupt a running cycle whose `start`/`resume` process has exited.
    /// To stop a cycle that is being followed, press Ctrl-C in that terminal.
    Interrupt,
    /// List all cycles, newest first
    History,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] ValidationError),

    #[error(transparent)]
    Timer(#[from] TimerServiceError),

    #[error("No cycle is running")]
    NoActiveCycle,

    #[error("Timer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Failed to listen for Ctrl-C: {0}")]
    Signal(#[source] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;
    init_tracing(&config.logging);

    let storage = Arc::new(FileSnapshotStorage::with_key(
        &config.storage.data_dir,
        config.storage.state_key.clone(),
    ));
    let facade = CycleFacade::load(storage, Arc::new(SystemClock)).await;

    match cli.command {
        Command::Start { task, minutes } => {
            let cmd = CreateCycleCommand::new(task, minutes.unwrap_or(config.timer.default_minutes))
                .validated(config.timer.bounds())?;
            let service = CycleTimerService::with_config(
                facade,
                Arc::new(TerminalTitle),
                config.timer.service_config(),
            );
            let (shutdown, shutdown_rx) = watch::channel(false);
            let (handle, task) = service.spawn(shutdown_rx);

            let outcome = match handle.create_cycle(cmd).await {
                Ok(cycle_id) => follow(&handle, cycle_id).await,
                Err(e) => Err(e.into()),
            };
            let _ = shutdown.send(true);
            task.await?;
            outcome
        }
        Command::Resume => {
            let cycle_id = facade
                .store()
                .active_cycle_id()
                .ok_or(CliError::NoActiveCycle)?;
            let service = CycleTimerService::with_config(
                facade,
                Arc::new(TerminalTitle),
                config.timer.service_config(),
            );
            let (shutdown, shutdown_rx) = watch::channel(false);
            let (handle, task) = service.spawn(shutdown_rx);

            let outcome = follow(&handle, cycle_id).await;
            let _ = shutdown.send(true);
            task.await?;
            outcome
        }
        Command::Status => {
            print_status(&facade.current_view());
            Ok(())
        }
        Command::Interrupt => {
            let mut facade = facade;
            let task = facade
                .store()
                .active_cycle()
                .map(|cycle| cycle.task().to_string());
            match (facade.interrupt_active_cycle().await, task) {
                (Some(_), Some(task)) => println!("Interrupted: {}", task),
                _ => println!("No cycle is running"),
            }
            Ok(())
        }
        Command::History => {
            print_history(&facade.current_view());
            Ok(())
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Redraws the countdown line until `cycle_id` is no longer active.
async fn follow(handle: &CycleTimerHandle, cycle_id: CycleId) -> Result<(), CliError> {
    let mut views = handle.subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let finished = render(&views.borrow_and_update(), cycle_id);
        if finished {
            return Ok(());
        }

        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
            signal = &mut ctrl_c => {
                signal.map_err(CliError::Signal)?;
                handle.interrupt_active_cycle().await?;
                println!();
                println!("Interrupted");
                return Ok(());
            }
        }
    }
}

/// Prints the countdown line. Returns true once the cycle has finished.
fn render(view: &CycleView, cycle_id: CycleId) -> bool {
    let mut stdout = io::stdout().lock();
    match &view.active_cycle {
        Some(active) if active.id() == cycle_id => {
            if let Some(countdown) = view.countdown() {
                let _ = write!(stdout, "\r{} {}", countdown, active.task());
                let _ = stdout.flush();
            }
            false
        }
        _ => {
            let status = view
                .cycles
                .iter()
                .find(|cycle| cycle.id() == cycle_id)
                .map(|cycle| cycle.status().to_string())
                .unwrap_or_else(|| "Finished".to_string());
            let _ = writeln!(stdout, "\r00:00 {}", status);
            true
        }
    }
}

fn print_status(view: &CycleView) {
    match (&view.active_cycle, view.countdown()) {
        (Some(active), Some(countdown)) => {
            println!("{} ({} remaining of {} min)", active.task(), countdown, active.planned_minutes());
        }
        _ => println!("No cycle is running"),
    }
}

fn print_history(view: &CycleView) {
    let history = view.history();
    if history.is_empty() {
        println!("No cycles yet");
        return;
    }
    for entry in history {
        println!(
            "{}  {:>3} min  {:<11}  {}",
            entry.started_at,
            entry.planned_minutes,
            entry.status.to_string(),
            entry.task
        );
    }
}
