//! Diesel row models for task persistence.

use super::schema::{task_activity, task_assignees, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Optional epic.
    pub epic_id: Option<Uuid>,
    /// Task name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Priority.
    pub priority: String,
    /// Optional deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Workflow status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Creating user.
    pub created_by: Uuid,
    /// First start of work.
    pub started_at: Option<DateTime<Utc>>,
    /// User who started work.
    pub started_by: Option<Uuid>,
    /// First submission for review.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// User who submitted for review.
    pub reviewed_by: Option<Uuid>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// User who completed the task.
    pub completed_by: Option<Uuid>,
    /// Seconds spent in closed sessions.
    pub accumulated_work_time: i64,
    /// Start of the open session.
    pub last_progress_start: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: i64,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: Uuid,
    /// Column values shared with updates.
    #[diesel(embed)]
    pub fields: TaskChangeset,
}

/// Mutable task columns, written on insert and on every update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Owning project.
    pub project_id: Uuid,
    /// Optional epic.
    pub epic_id: Option<Uuid>,
    /// Task name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Priority.
    pub priority: String,
    /// Optional deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Workflow status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Creating user.
    pub created_by: Uuid,
    /// First start of work.
    pub started_at: Option<DateTime<Utc>>,
    /// User who started work.
    pub started_by: Option<Uuid>,
    /// First submission for review.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// User who submitted for review.
    pub reviewed_by: Option<Uuid>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// User who completed the task.
    pub completed_by: Option<Uuid>,
    /// Seconds spent in closed sessions.
    pub accumulated_work_time: i64,
    /// Start of the open session.
    pub last_progress_start: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: i64,
}

/// Row linking a user to a task.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_assignees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssigneeRow {
    /// Assigned task.
    pub task_id: Uuid,
    /// Assigned user.
    pub user_id: Uuid,
    /// Position in the assignee list.
    pub position: i32,
}

/// Query result row for activity records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_activity)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
    /// Activity identifier.
    pub activity_id: Uuid,
    /// Task the activity belongs to.
    pub task_id: Uuid,
    /// Acting user.
    pub user_id: Uuid,
    /// Action kind.
    pub action_type: String,
    /// Status before the action.
    pub old_status: Option<String>,
    /// Status after the action.
    pub new_status: String,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
}

/// Insert model for activity records; `sequence` is assigned by the
/// database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_activity)]
pub struct NewActivityRow {
    /// Activity identifier.
    pub activity_id: Uuid,
    /// Task the activity belongs to.
    pub task_id: Uuid,
    /// Acting user.
    pub user_id: Uuid,
    /// Action kind.
    pub action_type: String,
    /// Status before the action.
    pub old_status: Option<String>,
    /// Status after the action.
    pub new_status: String,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
}
