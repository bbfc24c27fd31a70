//! Trackboard: task workflow core for project tracking.
//!
//! This crate provides the task lifecycle engine (status transitions,
//! milestone stamps, and work-time accounting), the append-only activity
//! trail, and the persistence and notification seams a web backend needs
//! around them.
//!
//! # Architecture
//!
//! Trackboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, logging)
//!
//! # Modules
//!
//! - [`task`]: Task creation, lifecycle transitions, and activity history
//! - [`config`]: Storage and logging configuration
//! - [`telemetry`]: `tracing` subscriber installation

pub mod config;
pub mod task;
pub mod telemetry;
