//! Cycle module - Work cycle entity, store aggregate, and time reconciliation.
//!
//! A Cycle is one timed work session. The CycleStore holds the full history
//! and at most one active cycle, and changes only through pure transitions.

mod aggregate;
mod countdown;
mod errors;
mod reconcile;
mod store;
mod view;

pub use aggregate::Cycle;
pub use countdown::{window_title, Countdown};
pub use errors::CycleStoreError;
pub use reconcile::{elapsed_seconds, reconcile, Reconciliation};
pub use store::{CycleAction, CycleStore};
pub use view::{CycleView, HistoryEntry};
