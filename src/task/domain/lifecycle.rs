//! Task lifecycle engine.
//!
//! The engine is a pure computation over a task snapshot: it validates a
//! requested status change, derives the new milestone and work-time fields,
//! and builds the activity record. Persisting both atomically is the
//! caller's job.
//!
//! Work time is tracked in sessions. A session opens whenever the task
//! enters `in_progress` and closes when it leaves; closed sessions are
//! folded into [`Task::accumulated_work_seconds`], which never decreases.

use super::{Actor, Stamp, Task, TaskActivity, TaskDomainError, TaskStatus};
use chrono::{DateTime, Utc};

/// Result of a successful status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    task: Task,
    activity: TaskActivity,
    previous_status: TaskStatus,
}

impl StatusTransition {
    /// Returns the updated task.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the activity record to append.
    #[must_use]
    pub const fn activity(&self) -> &TaskActivity {
        &self.activity
    }

    /// Returns the status the task had before the transition.
    #[must_use]
    pub const fn previous_status(&self) -> TaskStatus {
        self.previous_status
    }

    /// Returns `true` when the transition entered `for_review` or `done`
    /// from a different status.
    #[must_use]
    pub fn requires_notification(&self) -> bool {
        self.previous_status != self.task.status && self.task.status.is_notable()
    }

    /// Splits the transition into the updated task and its activity record.
    #[must_use]
    pub fn into_parts(self) -> (Task, TaskActivity) {
        (self.task, self.activity)
    }
}

/// Moves `task` to `new_status` on behalf of `actor` at `now`.
///
/// An activity record is produced for every call, including requests that
/// re-assert the current status.
///
/// # Errors
///
/// Returns [`TaskDomainError::CompletionForbidden`] when `new_status` is
/// [`TaskStatus::Done`] and the actor is neither a manager nor an admin.
/// The input task is never modified.
pub fn transition(
    task: &Task,
    new_status: TaskStatus,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<StatusTransition, TaskDomainError> {
    if new_status == TaskStatus::Done && !actor.is_privileged() {
        return Err(TaskDomainError::CompletionForbidden {
            task_id: task.id,
            actor: actor.user_id(),
        });
    }

    let old_status = task.status;
    let stamp = Stamp::new(now, actor.user_id());
    let mut next = task.clone();
    next.status = new_status;

    record_milestones(&mut next, old_status, stamp);
    clear_backward_milestones(&mut next, old_status);
    next.touch(now);

    let activity =
        TaskActivity::status_change(task.id, actor.user_id(), old_status, new_status, now);

    Ok(StatusTransition {
        task: next,
        activity,
        previous_status: old_status,
    })
}

/// Builds the activity record written alongside a newly created task.
#[must_use]
pub fn on_create(task: &Task, actor: &Actor, now: DateTime<Utc>) -> TaskActivity {
    TaskActivity::created(task.id, actor.user_id(), now)
}

/// Returns the total seconds worked, including the open session if the
/// task is currently `in_progress`.
#[must_use]
pub fn compute_time_worked(task: &Task, now: DateTime<Utc>) -> u64 {
    let open_session = match (task.status, task.last_progress_start) {
        (TaskStatus::InProgress, Some(start)) => elapsed_seconds(start, now),
        _ => 0,
    };
    task.accumulated_work_seconds.saturating_add(open_session)
}

/// Returns the seconds from creation to completion for a done task.
#[must_use]
pub fn compute_total_time(task: &Task) -> Option<u64> {
    if task.status != TaskStatus::Done {
        return None;
    }
    task.completed
        .map(|completed| elapsed_seconds(task.created.at(), completed.at()))
}

/// Session accounting and milestone stamping for a transition.
fn record_milestones(task: &mut Task, old_status: TaskStatus, stamp: Stamp) {
    let new_status = task.status;
    let now = stamp.at();

    if new_status == TaskStatus::InProgress {
        if old_status == TaskStatus::ToDo && task.started.is_none() {
            task.started = Some(stamp);
        }
        // Re-asserting in_progress keeps the running session intact.
        if old_status != TaskStatus::InProgress || task.last_progress_start.is_none() {
            task.last_progress_start = Some(now);
        }
    }

    if old_status == TaskStatus::InProgress && new_status != TaskStatus::InProgress {
        close_session(task, now);
    }

    if new_status == TaskStatus::ForReview
        && old_status == TaskStatus::InProgress
        && task.reviewed.is_none()
    {
        task.reviewed = Some(stamp);
    }

    if new_status == TaskStatus::Done && old_status != TaskStatus::Done {
        task.completed = Some(stamp);
    }
}

/// Clears milestones that no longer hold after moving backwards.
fn clear_backward_milestones(task: &mut Task, old_status: TaskStatus) {
    match task.status {
        TaskStatus::ToDo => {
            task.started = None;
            task.reviewed = None;
            task.completed = None;
            task.last_progress_start = None;
        }
        TaskStatus::InProgress
            if matches!(old_status, TaskStatus::ForReview | TaskStatus::Done) =>
        {
            task.reviewed = None;
            task.completed = None;
        }
        TaskStatus::ForReview => {
            task.completed = None;
        }
        TaskStatus::InProgress | TaskStatus::Done => {}
    }
}

fn close_session(task: &mut Task, now: DateTime<Utc>) {
    if let Some(start) = task.last_progress_start.take() {
        task.accumulated_work_seconds = task
            .accumulated_work_seconds
            .saturating_add(elapsed_seconds(start, now));
    }
}

/// Whole seconds from `start` to `end`; zero when the clock went backwards.
fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    u64::try_from(end.signed_duration_since(start).num_seconds()).unwrap_or(0)
}
