//! Application layer - Commands, the cycle facade, and the timer service.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The facade is the only writer of the cycle store; the timer service owns
//! the facade and drives it from a single task.

mod commands;
mod cycle_facade;
mod timer_service;

pub use commands::{CreateCycleCommand, DurationBounds};
pub use cycle_facade::{CycleError, CycleFacade, TickOutcome};
pub use timer_service::{
    CycleTimerHandle, CycleTimerService, TimerServiceConfig, TimerServiceError,
};
