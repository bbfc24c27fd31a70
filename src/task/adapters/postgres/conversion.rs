//! Conversions between domain aggregates and Diesel rows.

use super::models::{ActivityRow, AssigneeRow, NewActivityRow, NewTaskRow, TaskChangeset, TaskRow};
use crate::task::{
    domain::{
        ActivityAction, ActivityId, EpicId, PersistedActivityData, PersistedTaskData, ProjectId,
        Stamp, Task, TaskActivity, TaskId, TaskName, TaskPriority, TaskStatus, UserId,
    },
    ports::{TaskRepositoryError, TaskRepositoryResult},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Converts a stored version column into the domain counter.
pub fn version_from_column(value: i64) -> TaskRepositoryResult<u64> {
    u64::try_from(value).map_err(TaskRepositoryError::persistence)
}

/// Converts a domain version counter into its column value.
pub fn version_to_column(value: u64) -> TaskRepositoryResult<i64> {
    i64::try_from(value).map_err(TaskRepositoryError::persistence)
}

pub fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        fields: to_changeset(task)?,
    })
}

pub fn to_changeset(task: &Task) -> TaskRepositoryResult<TaskChangeset> {
    let (started_at, started_by) = split_stamp(task.started());
    let (reviewed_at, reviewed_by) = split_stamp(task.reviewed());
    let (completed_at, completed_by) = split_stamp(task.completed());
    let accumulated_work_time = i64::try_from(task.accumulated_work_seconds())
        .map_err(TaskRepositoryError::persistence)?;

    Ok(TaskChangeset {
        project_id: task.project_id().into_inner(),
        epic_id: task.epic_id().map(EpicId::into_inner),
        name: task.name().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        priority: task.priority().as_str().to_owned(),
        deadline: task.deadline(),
        status: task.status().as_str().to_owned(),
        created_at: task.created_at(),
        created_by: task.created_by().into_inner(),
        started_at,
        started_by,
        reviewed_at,
        reviewed_by,
        completed_at,
        completed_by,
        accumulated_work_time,
        last_progress_start: task.last_progress_start(),
        updated_at: task.updated_at(),
        version: version_to_column(task.version())?,
    })
}

pub fn to_assignee_rows(task: &Task) -> TaskRepositoryResult<Vec<AssigneeRow>> {
    task.assignees()
        .iter()
        .enumerate()
        .map(|(index, user_id)| {
            let position = i32::try_from(index).map_err(TaskRepositoryError::persistence)?;
            Ok(AssigneeRow {
                task_id: task.id().into_inner(),
                user_id: user_id.into_inner(),
                position,
            })
        })
        .collect()
}

pub fn to_activity_row(activity: &TaskActivity) -> NewActivityRow {
    NewActivityRow {
        activity_id: activity.id().into_inner(),
        task_id: activity.task_id().into_inner(),
        user_id: activity.user_id().into_inner(),
        action_type: activity.action().as_str().to_owned(),
        old_status: activity.old_status().map(|status| status.as_str().to_owned()),
        new_status: activity.new_status().as_str().to_owned(),
        timestamp: activity.timestamp(),
    }
}

/// Rebuilds a task from its row and its assignees (already in position
/// order).
pub fn row_to_task(row: TaskRow, assignees: Vec<Uuid>) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        project_id,
        epic_id,
        name: persisted_name,
        description,
        priority: persisted_priority,
        deadline,
        status: persisted_status,
        created_at,
        created_by,
        started_at,
        started_by,
        reviewed_at,
        reviewed_by,
        completed_at,
        completed_by,
        accumulated_work_time,
        last_progress_start,
        updated_at,
        version,
    } = row;

    let name = TaskName::new(persisted_name).map_err(TaskRepositoryError::persistence)?;
    let priority = TaskPriority::try_from(persisted_priority.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let accumulated_work_seconds =
        u64::try_from(accumulated_work_time).map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        project_id: ProjectId::from_uuid(project_id),
        epic_id: epic_id.map(EpicId::from_uuid),
        name,
        description,
        priority,
        deadline,
        assignees: assignees.into_iter().map(UserId::from_uuid).collect(),
        status,
        created: Stamp::new(created_at, UserId::from_uuid(created_by)),
        started: join_stamp(started_at, started_by),
        reviewed: join_stamp(reviewed_at, reviewed_by),
        completed: join_stamp(completed_at, completed_by),
        accumulated_work_seconds,
        last_progress_start,
        updated_at,
        version: version_from_column(version)?,
    };
    Ok(Task::from_persisted(data))
}

pub fn row_to_activity(row: ActivityRow) -> TaskRepositoryResult<TaskActivity> {
    let action = ActivityAction::try_from(row.action_type.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let old_status = row
        .old_status
        .as_deref()
        .map(TaskStatus::try_from)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let new_status =
        TaskStatus::try_from(row.new_status.as_str()).map_err(TaskRepositoryError::persistence)?;

    Ok(TaskActivity::from_persisted(PersistedActivityData {
        id: ActivityId::from_uuid(row.activity_id),
        task_id: TaskId::from_uuid(row.task_id),
        user_id: UserId::from_uuid(row.user_id),
        action,
        old_status,
        new_status,
        timestamp: row.timestamp,
    }))
}

fn split_stamp(stamp: Option<Stamp>) -> (Option<DateTime<Utc>>, Option<Uuid>) {
    stamp.map_or((None, None), |value| {
        (Some(value.at()), Some(value.by().into_inner()))
    })
}

/// Pairs timestamp and user columns; a half-set pair reads as absent.
fn join_stamp(at: Option<DateTime<Utc>>, by: Option<Uuid>) -> Option<Stamp> {
    at.zip(by)
        .map(|(timestamp, user)| Stamp::new(timestamp, UserId::from_uuid(user)))
}
