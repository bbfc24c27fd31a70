//! Error types for task domain validation and parsing.

use super::{TaskId, UserId};
use thiserror::Error;

/// Errors returned while constructing or transitioning domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The task name exceeds the maximum length.
    #[error("task name exceeds {max} characters (got {actual})")]
    TaskNameTooLong {
        /// Maximum permitted length in characters.
        max: usize,
        /// Length of the rejected name in characters.
        actual: usize,
    },

    /// The actor's role may not mark tasks as done.
    #[error("user {actor} may not move task {task_id} to done; only managers and admins can")]
    CompletionForbidden {
        /// Task the transition was requested for.
        task_id: TaskId,
        /// User who requested the transition.
        actor: UserId,
    },
}

/// Error returned while parsing task statuses from requests or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid status '{0}', must be one of: to_do, in_progress, for_review, done")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid priority '{0}', must be one of: low, medium, high")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing user roles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown user role: {0}")]
pub struct ParseUserRoleError(pub String);

/// Error returned while parsing activity action types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown activity action: {0}")]
pub struct ParseActivityActionError(pub String);
