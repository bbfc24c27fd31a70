//! Port contracts for task workflow management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod notifier;
pub mod repository;

pub use notifier::{NotificationError, StatusChangeNotification, StatusChangeNotifier};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
