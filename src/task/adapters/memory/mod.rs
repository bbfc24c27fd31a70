//! In-memory adapters for task workflow tests.

mod notifier;
mod task;

pub use notifier::RecordingNotifier;
pub use task::InMemoryTaskRepository;
