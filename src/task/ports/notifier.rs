//! Notification port for status changes that need a human's attention.

use crate::task::domain::{Actor, StatusTransition, TaskId, TaskStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// A task entered `for_review` or `done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChangeNotification {
    /// Task that changed.
    pub task_id: TaskId,
    /// Task name at the time of the change.
    pub task_name: String,
    /// Status before the change.
    pub old_status: TaskStatus,
    /// Status after the change.
    pub new_status: TaskStatus,
    /// Who performed the change.
    pub actor: Actor,
    /// When the change happened.
    pub at: DateTime<Utc>,
}

impl StatusChangeNotification {
    /// Builds a notification from a committed transition.
    #[must_use]
    pub fn from_transition(transition: &StatusTransition, actor: Actor) -> Self {
        let task = transition.task();
        Self {
            task_id: task.id(),
            task_name: task.name().as_str().to_owned(),
            old_status: transition.previous_status(),
            new_status: task.status(),
            actor,
            at: transition.activity().timestamp(),
        }
    }
}

/// Delivery contract for status change notifications.
#[async_trait]
pub trait StatusChangeNotifier: Send + Sync {
    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when delivery fails. The transition
    /// that triggered the notification stays committed.
    async fn notify(&self, notification: &StatusChangeNotification)
    -> Result<(), NotificationError>;
}

/// Error returned when a notification could not be delivered.
#[derive(Debug, Clone, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotificationError(pub Arc<dyn std::error::Error + Send + Sync>);

impl NotificationError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
