//! Task workflow management.
//!
//! This module tracks tasks through the `to_do → in_progress → for_review →
//! done` workflow. Every status change is validated by the lifecycle engine,
//! stamps who moved the task and when, accumulates time spent in
//! `in_progress` across rework cycles, and appends an immutable activity
//! record. The module follows hexagonal architecture:
//!
//! - Domain types and the lifecycle engine in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
