//! Work Cycles - timed work sessions with a persisted, self-correcting countdown
//!
//! A cycle is a task with a planned duration. At most one cycle runs at a
//! time. Elapsed time is recomputed from the wall clock on every tick, and
//! the whole history survives restarts as a single JSON snapshot.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
