//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, status, errors)
//! - `cycle` - Cycle entity, the cycle store reducer, and elapsed-time reconciliation

pub mod cycle;
pub mod foundation;
