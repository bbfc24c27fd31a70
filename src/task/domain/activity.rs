//! Append-only audit records for task creation and status changes.

use super::{ActivityId, ParseActivityActionError, TaskId, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of event an activity record captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// The task was created.
    Created,
    /// The task's status was changed (or re-asserted).
    StatusChange,
}

impl ActivityAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusChange => "status_change",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ActivityAction {
    type Error = ParseActivityActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "created" => Ok(Self::Created),
            "status_change" => Ok(Self::StatusChange),
            _ => Err(ParseActivityActionError(value.to_owned())),
        }
    }
}

/// Immutable audit entry for one task event.
///
/// Activity records have no mutators: once built they are only stored,
/// read back, or deleted together with their task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskActivity {
    id: ActivityId,
    task_id: TaskId,
    user_id: UserId,
    action: ActivityAction,
    old_status: Option<TaskStatus>,
    new_status: TaskStatus,
    timestamp: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted activity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedActivityData {
    /// Persisted activity identifier.
    pub id: ActivityId,
    /// Task the activity belongs to.
    pub task_id: TaskId,
    /// User who performed the action.
    pub user_id: UserId,
    /// Persisted action kind.
    pub action: ActivityAction,
    /// Status before the action, absent for creation.
    pub old_status: Option<TaskStatus>,
    /// Status after the action.
    pub new_status: TaskStatus,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
}

impl TaskActivity {
    /// Builds the record written when a task is created.
    #[must_use]
    pub fn created(task_id: TaskId, user_id: UserId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: ActivityId::new(),
            task_id,
            user_id,
            action: ActivityAction::Created,
            old_status: None,
            new_status: TaskStatus::ToDo,
            timestamp,
        }
    }

    /// Builds the record written for a status transition.
    #[must_use]
    pub fn status_change(
        task_id: TaskId,
        user_id: UserId,
        old_status: TaskStatus,
        new_status: TaskStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            task_id,
            user_id,
            action: ActivityAction::StatusChange,
            old_status: Some(old_status),
            new_status,
            timestamp,
        }
    }

    /// Reconstructs an activity record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedActivityData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            user_id: data.user_id,
            action: data.action,
            old_status: data.old_status,
            new_status: data.new_status,
            timestamp: data.timestamp,
        }
    }

    /// Returns the activity identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityId {
        self.id
    }

    /// Returns the task the activity belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the user who performed the action.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the action kind.
    #[must_use]
    pub const fn action(&self) -> ActivityAction {
        self.action
    }

    /// Returns the status before the action, absent for creation.
    #[must_use]
    pub const fn old_status(&self) -> Option<TaskStatus> {
        self.old_status
    }

    /// Returns the status after the action.
    #[must_use]
    pub const fn new_status(&self) -> TaskStatus {
        self.new_status
    }

    /// Returns when the action happened.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Ordered activity trail of one task.
///
/// Entries are sorted by ascending timestamp; entries sharing a timestamp
/// keep the order in which they were appended. Iteration borrows the
/// history, so it can be walked any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityHistory(Vec<TaskActivity>);

impl ActivityHistory {
    /// Builds a history from records in append order.
    #[must_use]
    pub fn from_appended(mut activities: Vec<TaskActivity>) -> Self {
        // Stable sort keeps append order for equal timestamps.
        activities.sort_by_key(TaskActivity::timestamp);
        Self(activities)
    }

    /// Returns an iterator over the records in chronological order.
    pub fn iter(&self) -> std::slice::Iter<'_, TaskActivity> {
        self.0.iter()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the task has no recorded activity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the most recent record, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&TaskActivity> {
        self.0.last()
    }

    /// Consumes the history, returning the records.
    #[must_use]
    pub fn into_vec(self) -> Vec<TaskActivity> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ActivityHistory {
    type Item = &'a TaskActivity;
    type IntoIter = std::slice::Iter<'a, TaskActivity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ActivityHistory {
    type Item = TaskActivity;
    type IntoIter = std::vec::IntoIter<TaskActivity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
