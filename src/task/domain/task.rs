//! Task aggregate root and its construction and edit parameters.

use super::{EpicId, ProjectId, TaskId, TaskName, TaskPriority, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A paired timestamp and actor.
///
/// Lifecycle milestones (`started`, `reviewed`, `completed`) are recorded
/// as stamps so the time and the user are always set and cleared together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    at: DateTime<Utc>,
    by: UserId,
}

impl Stamp {
    /// Creates a stamp.
    #[must_use]
    pub const fn new(at: DateTime<Utc>, by: UserId) -> Self {
        Self { at, by }
    }

    /// Returns when the milestone was reached.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// Returns who reached the milestone.
    #[must_use]
    pub const fn by(&self) -> UserId {
        self.by
    }
}

/// Task aggregate root.
///
/// Lifecycle fields are only changed by the engine in
/// [`super::lifecycle`]; descriptive fields through [`TaskDetailsPatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub(super) id: TaskId,
    project_id: ProjectId,
    epic_id: Option<EpicId>,
    name: TaskName,
    description: Option<String>,
    priority: TaskPriority,
    deadline: Option<DateTime<Utc>>,
    assignees: Vec<UserId>,
    pub(super) status: TaskStatus,
    pub(super) created: Stamp,
    pub(super) started: Option<Stamp>,
    pub(super) reviewed: Option<Stamp>,
    pub(super) completed: Option<Stamp>,
    pub(super) accumulated_work_seconds: u64,
    pub(super) last_progress_start: Option<DateTime<Utc>>,
    pub(super) updated_at: DateTime<Utc>,
    pub(super) version: u64,
}

/// Descriptive fields supplied when creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    project_id: ProjectId,
    name: TaskName,
    description: Option<String>,
    epic_id: Option<EpicId>,
    priority: TaskPriority,
    deadline: Option<DateTime<Utc>>,
    assignees: Vec<UserId>,
}

impl TaskDraft {
    /// Creates a draft with the required fields and default priority.
    #[must_use]
    pub fn new(project_id: ProjectId, name: TaskName) -> Self {
        Self {
            project_id,
            name,
            description: None,
            epic_id: None,
            priority: TaskPriority::default(),
            deadline: None,
            assignees: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_description(description.into());
        self
    }

    /// Places the task in an epic.
    #[must_use]
    pub const fn with_epic(mut self, epic_id: EpicId) -> Self {
        self.epic_id = Some(epic_id);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the assignees. Duplicates are dropped, first occurrence wins.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = dedup_assignees(assignees);
        self
    }
}

/// Partial update of a task's descriptive fields.
///
/// Unset fields are left untouched. Lifecycle fields are not editable
/// through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDetailsPatch {
    name: Option<TaskName>,
    description: Option<Option<String>>,
    epic_id: Option<Option<EpicId>>,
    priority: Option<TaskPriority>,
    deadline: Option<Option<DateTime<Utc>>>,
    assignees: Option<Vec<UserId>>,
}

impl TaskDetailsPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the name.
    #[must_use]
    pub fn with_name(mut self, name: TaskName) -> Self {
        self.name = Some(name);
        self
    }

    /// Replaces the description; a blank value clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(normalize_description(description.into()));
        self
    }

    /// Moves the task into an epic, or out of any epic when `None`.
    #[must_use]
    pub const fn with_epic(mut self, epic_id: Option<EpicId>) -> Self {
        self.epic_id = Some(epic_id);
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replaces the deadline, or clears it when `None`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Replaces the assignee list.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = Some(dedup_assignees(assignees));
        self
    }

    /// Returns `true` when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.epic_id.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
            && self.assignees.is_none()
    }
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Epic the task belongs to, if any.
    pub epic_id: Option<EpicId>,
    /// Task name.
    pub name: TaskName,
    /// Free-form description.
    pub description: Option<String>,
    /// Priority.
    pub priority: TaskPriority,
    /// Deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Assigned users in assignment order.
    pub assignees: Vec<UserId>,
    /// Workflow status.
    pub status: TaskStatus,
    /// Creation stamp.
    pub created: Stamp,
    /// First start of work, if any.
    pub started: Option<Stamp>,
    /// First submission for review, if any.
    pub reviewed: Option<Stamp>,
    /// Completion, if any.
    pub completed: Option<Stamp>,
    /// Seconds spent in closed `in_progress` sessions.
    pub accumulated_work_seconds: u64,
    /// Start of the open `in_progress` session, if any.
    pub last_progress_start: Option<DateTime<Utc>>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl Task {
    /// Creates a new task in the `to_do` status.
    #[must_use]
    pub fn new(draft: TaskDraft, created_by: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            project_id: draft.project_id,
            epic_id: draft.epic_id,
            name: draft.name,
            description: draft.description,
            priority: draft.priority,
            deadline: draft.deadline,
            assignees: draft.assignees,
            status: TaskStatus::ToDo,
            created: Stamp::new(created_at, created_by),
            started: None,
            reviewed: None,
            completed: None,
            accumulated_work_seconds: 0,
            last_progress_start: None,
            updated_at: created_at,
            version: 0,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            epic_id: data.epic_id,
            name: data.name,
            description: data.description,
            priority: data.priority,
            deadline: data.deadline,
            assignees: data.assignees,
            status: data.status,
            created: data.created,
            started: data.started,
            reviewed: data.reviewed,
            completed: data.completed,
            accumulated_work_seconds: data.accumulated_work_seconds,
            last_progress_start: data.last_progress_start,
            updated_at: data.updated_at,
            version: data.version,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the epic, if any.
    #[must_use]
    pub const fn epic_id(&self) -> Option<EpicId> {
        self.epic_id
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Returns the assigned users.
    #[must_use]
    pub fn assignees(&self) -> &[UserId] {
        &self.assignees
    }

    /// Returns `true` when the user is assigned to this task.
    #[must_use]
    pub fn is_assigned_to(&self, user_id: UserId) -> bool {
        self.assignees.contains(&user_id)
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created.at
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created.by
    }

    /// Returns the first start of work since the task last left `to_do`.
    #[must_use]
    pub const fn started(&self) -> Option<Stamp> {
        self.started
    }

    /// Returns the first submission for review in the current cycle.
    #[must_use]
    pub const fn reviewed(&self) -> Option<Stamp> {
        self.reviewed
    }

    /// Returns the completion stamp while the task is done.
    #[must_use]
    pub const fn completed(&self) -> Option<Stamp> {
        self.completed
    }

    /// Returns the seconds accumulated by closed `in_progress` sessions.
    #[must_use]
    pub const fn accumulated_work_seconds(&self) -> u64 {
        self.accumulated_work_seconds
    }

    /// Returns the start of the open `in_progress` session, if any.
    #[must_use]
    pub const fn last_progress_start(&self) -> Option<DateTime<Utc>> {
        self.last_progress_start
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Applies a details patch, bumping the version and `updated_at`.
    ///
    /// An empty patch leaves the task untouched.
    pub fn apply_details(&mut self, patch: TaskDetailsPatch, now: DateTime<Utc>) {
        if patch.is_empty() {
            return;
        }
        let TaskDetailsPatch {
            name,
            description,
            epic_id,
            priority,
            deadline,
            assignees,
        } = patch;

        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_epic) = epic_id {
            self.epic_id = new_epic;
        }
        if let Some(new_priority) = priority {
            self.priority = new_priority;
        }
        if let Some(new_deadline) = deadline {
            self.deadline = new_deadline;
        }
        if let Some(new_assignees) = assignees {
            self.assignees = new_assignees;
        }
        self.touch(now);
    }

    pub(super) const fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version = self.version.saturating_add(1);
    }
}

fn normalize_description(description: String) -> Option<String> {
    if description.trim().is_empty() {
        None
    } else {
        Some(description)
    }
}

fn dedup_assignees(assignees: impl IntoIterator<Item = UserId>) -> Vec<UserId> {
    let mut unique: Vec<UserId> = Vec::new();
    for user_id in assignees {
        if !unique.contains(&user_id) {
            unique.push(user_id);
        }
    }
    unique
}
