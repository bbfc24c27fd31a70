//! Adapter implementations for task workflow ports.

pub mod memory;
pub mod postgres;
pub mod tracing_notifier;

pub use tracing_notifier::TracingNotifier;
