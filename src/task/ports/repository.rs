//! Repository port for task persistence, lookup, and the activity trail.

use crate::task::domain::{ActivityHistory, ProjectId, Task, TaskActivity, TaskId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Writes that touch a task and its activity trail are atomic: either both
/// the task row and the activity record are stored, or neither is. Updates
/// use optimistic concurrency on [`Task::version`]; the caller passes the
/// version it read and the write is refused if another writer got there
/// first.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task together with its creation activity.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID
    /// already exists.
    async fn store(&self, task: &Task, created: &TaskActivity) -> TaskRepositoryResult<()>;

    /// Persists descriptive edits to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist or [`TaskRepositoryError::VersionConflict`] when the stored
    /// version differs from `expected_version`.
    async fn update_details(&self, task: &Task, expected_version: u64)
    -> TaskRepositoryResult<()>;

    /// Persists a status transition and appends its activity record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist or [`TaskRepositoryError::VersionConflict`] when the stored
    /// version differs from `expected_version`. Nothing is written on error.
    async fn commit_transition(
        &self,
        task: &Task,
        activity: &TaskActivity,
        expected_version: u64,
    ) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns all tasks of a project, oldest first.
    async fn find_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns all tasks the user is assigned to, oldest first.
    async fn find_assigned_to(&self, user_id: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the activity trail of a task in chronological order.
    ///
    /// An unknown task yields an empty history.
    async fn activity_history(&self, id: TaskId) -> TaskRepositoryResult<ActivityHistory>;

    /// Deletes a task and, with it, its whole activity trail.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Another writer changed the task since it was read.
    #[error("task {task_id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        /// Task being written.
        task_id: TaskId,
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
