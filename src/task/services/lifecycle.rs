//! Service layer for task creation, edits, status transitions, and lookup.

use crate::task::{
    adapters::TracingNotifier,
    domain::{
        ActivityHistory, Actor, EpicId, ParseTaskPriorityError, ParseTaskStatusError, ProjectId,
        Task, TaskDetailsPatch, TaskDomainError, TaskDraft, TaskId, TaskName, TaskPriority,
        TaskStatus, UserId, lifecycle,
    },
    ports::{
        StatusChangeNotification, StatusChangeNotifier, TaskRepository, TaskRepositoryError,
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    project_id: ProjectId,
    name: String,
    description: Option<String>,
    epic_id: Option<EpicId>,
    priority: Option<String>,
    deadline: Option<DateTime<Utc>>,
    assignees: Vec<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            project_id,
            name: name.into(),
            description: None,
            epic_id: None,
            priority: None,
            deadline: None,
            assignees: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Places the task in an epic.
    #[must_use]
    pub const fn with_epic(mut self, epic_id: EpicId) -> Self {
        self.epic_id = Some(epic_id);
        self
    }

    /// Sets the priority from its textual form.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = assignees.into_iter().collect();
        self
    }
}

/// Request payload for editing a task's descriptive fields.
///
/// Only the fields that were set are changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    task_id: TaskId,
    name: Option<String>,
    description: Option<String>,
    epic_id: Option<Option<EpicId>>,
    priority: Option<String>,
    deadline: Option<Option<DateTime<Utc>>>,
    assignees: Option<Vec<UserId>>,
}

impl UpdateTaskRequest {
    /// Creates a request that changes nothing yet.
    #[must_use]
    pub const fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            name: None,
            description: None,
            epic_id: None,
            priority: None,
            deadline: None,
            assignees: None,
        }
    }

    /// Renames the task.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the description; an empty string clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Moves the task into an epic, or out of any epic with `None`.
    #[must_use]
    pub const fn with_epic(mut self, epic_id: Option<EpicId>) -> Self {
        self.epic_id = Some(epic_id);
        self
    }

    /// Sets the priority from its textual form.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets or clears the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Replaces the assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = Some(assignees.into_iter().collect());
        self
    }
}

/// Request payload for a status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTaskRequest {
    task_id: TaskId,
    target_status: String,
}

impl TransitionTaskRequest {
    /// Creates a transition request from the textual target status.
    #[must_use]
    pub fn new(task_id: TaskId, target_status: impl Into<String>) -> Self {
        Self {
            task_id,
            target_status: target_status.into(),
        }
    }

    /// Returns the task the transition targets.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }
}

/// Operations restricted to managers and admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegedAction {
    /// Creating a task.
    CreateTask,
    /// Editing a task's details.
    UpdateTask,
    /// Deleting a task.
    DeleteTask,
}

impl std::fmt::Display for PrivilegedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::CreateTask => "create tasks",
            Self::UpdateTask => "edit tasks",
            Self::DeleteTask => "delete tasks",
        })
    }
}

/// Service-level errors for task workflow operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed, including the completion privilege check.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The requested status is not one of the workflow statuses.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),
    /// The requested priority is not recognised.
    #[error(transparent)]
    InvalidPriority(#[from] ParseTaskPriorityError),
    /// The actor's role does not allow the operation.
    #[error("only managers and admins can {action}")]
    NotPermitted {
        /// Operation that was refused.
        action: PrivilegedAction,
    },
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for task workflow service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task workflow orchestration service.
///
/// Reads a task, lets the domain compute the change, and hands the result
/// to the repository in a single atomic write. Concurrent writers are
/// detected by the repository's version check and reported as
/// [`TaskRepositoryError::VersionConflict`]; the service does not retry.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    notifier: Arc<dyn StatusChangeNotifier>,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service that reports notable transitions through
    /// [`TracingNotifier`].
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Replaces the notifier used for `for_review` and `done` transitions.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn StatusChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Creates a task in `to_do` and records its creation activity.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotPermitted`] for non-privileged
    /// actors, [`TaskLifecycleError::Domain`] or
    /// [`TaskLifecycleError::InvalidPriority`] for invalid input, and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    #[instrument(skip(self, request), fields(actor = %actor.user_id(), project = %request.project_id))]
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
        actor: Actor,
    ) -> TaskLifecycleResult<Task> {
        ensure_privileged(&actor, PrivilegedAction::CreateTask)?;

        let name = TaskName::new(request.name)?;
        let mut draft = TaskDraft::new(request.project_id, name).with_assignees(request.assignees);
        if let Some(description) = request.description {
            draft = draft.with_description(description);
        }
        if let Some(epic_id) = request.epic_id {
            draft = draft.with_epic(epic_id);
        }
        if let Some(priority) = request.priority {
            draft = draft.with_priority(TaskPriority::try_from(priority.as_str())?);
        }
        if let Some(deadline) = request.deadline {
            draft = draft.with_deadline(deadline);
        }

        let now = self.clock.utc();
        let task = Task::new(draft, actor.user_id(), now);
        let created = lifecycle::on_create(&task, &actor, now);
        self.repository.store(&task, &created).await?;
        info!(task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Edits a task's descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotPermitted`] for non-privileged
    /// actors, [`TaskLifecycleError::NotFound`] for unknown tasks, validation
    /// errors for invalid input, and [`TaskLifecycleError::Repository`] when
    /// persistence fails or another writer changed the task first.
    #[instrument(skip(self, request), fields(actor = %actor.user_id(), task_id = %request.task_id))]
    pub async fn update_details(
        &self,
        request: UpdateTaskRequest,
        actor: Actor,
    ) -> TaskLifecycleResult<Task> {
        ensure_privileged(&actor, PrivilegedAction::UpdateTask)?;

        let mut task = self.load(request.task_id).await?;
        let expected_version = task.version();
        let patch = build_patch(request)?;
        if patch.is_empty() {
            debug!("empty update; nothing to persist");
            return Ok(task);
        }

        task.apply_details(patch, self.clock.utc());
        self.repository
            .update_details(&task, expected_version)
            .await?;
        info!(version = task.version(), "task details updated");
        Ok(task)
    }

    /// Moves a task to a new status, recording the activity atomically.
    ///
    /// Transitions into `for_review` or `done` from another status notify
    /// the configured notifier after the write is committed; a failed
    /// notification is logged and does not fail the call.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidStatus`] for an unknown target,
    /// [`TaskLifecycleError::NotFound`] for unknown tasks,
    /// [`TaskLifecycleError::Domain`] with
    /// [`TaskDomainError::CompletionForbidden`] when a non-privileged actor
    /// requests `done`, and [`TaskLifecycleError::Repository`] when
    /// persistence fails. No state is written on error.
    #[instrument(
        skip(self, request),
        fields(actor = %actor.user_id(), task_id = %request.task_id, target = %request.target_status)
    )]
    pub async fn transition_task(
        &self,
        request: TransitionTaskRequest,
        actor: Actor,
    ) -> TaskLifecycleResult<Task> {
        let target = TaskStatus::try_from(request.target_status.as_str())?;
        let task = self.load(request.task_id).await?;

        let transition = lifecycle::transition(&task, target, &actor, self.clock.utc())?;
        self.repository
            .commit_transition(transition.task(), transition.activity(), task.version())
            .await?;
        info!(
            from = %transition.previous_status(),
            to = %target,
            "task status changed"
        );

        if transition.requires_notification() {
            let notification = StatusChangeNotification::from_transition(&transition, actor);
            if let Err(err) = self.notifier.notify(&notification).await {
                warn!(error = %err, "status change notification failed");
            }
        }

        let (updated, _activity) = transition.into_parts();
        Ok(updated)
    }

    /// Deletes a task together with its activity trail.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotPermitted`] for non-privileged
    /// actors, [`TaskLifecycleError::NotFound`] for unknown tasks, and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    #[instrument(skip(self), fields(actor = %actor.user_id()))]
    pub async fn delete_task(&self, task_id: TaskId, actor: Actor) -> TaskLifecycleResult<()> {
        ensure_privileged(&actor, PrivilegedAction::DeleteTask)?;
        self.repository.delete(task_id).await.map_err(|err| match err {
            TaskRepositoryError::NotFound(id) => TaskLifecycleError::NotFound(id),
            other => TaskLifecycleError::Repository(other),
        })?;
        info!("task deleted");
        Ok(())
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn find_by_id(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(task_id).await?)
    }

    /// Returns the tasks of a project, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn tasks_for_project(&self, project_id: ProjectId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_by_project(project_id).await?)
    }

    /// Returns the tasks assigned to a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn tasks_assigned_to(&self, user_id: UserId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_assigned_to(user_id).await?)
    }

    /// Returns the activity trail of a task in chronological order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks and
    /// [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn activity_history(&self, task_id: TaskId) -> TaskLifecycleResult<ActivityHistory> {
        self.load(task_id).await?;
        Ok(self.repository.activity_history(task_id).await?)
    }

    /// Returns the seconds worked on a task so far, counting the open
    /// session up to the current clock time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks and
    /// [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn time_worked(&self, task_id: TaskId) -> TaskLifecycleResult<u64> {
        let task = self.load(task_id).await?;
        Ok(lifecycle::compute_time_worked(&task, self.clock.utc()))
    }

    /// Returns the seconds from creation to completion of a done task.
    ///
    /// Returns `Ok(None)` when the task is not done.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks and
    /// [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn total_time(&self, task_id: TaskId) -> TaskLifecycleResult<Option<u64>> {
        let task = self.load(task_id).await?;
        Ok(lifecycle::compute_total_time(&task))
    }

    async fn load(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }
}

const fn ensure_privileged(actor: &Actor, action: PrivilegedAction) -> TaskLifecycleResult<()> {
    if actor.is_privileged() {
        Ok(())
    } else {
        Err(TaskLifecycleError::NotPermitted { action })
    }
}

fn build_patch(request: UpdateTaskRequest) -> TaskLifecycleResult<TaskDetailsPatch> {
    let mut patch = TaskDetailsPatch::new();
    if let Some(name) = request.name {
        patch = patch.with_name(TaskName::new(name)?);
    }
    if let Some(description) = request.description {
        patch = patch.with_description(description);
    }
    if let Some(epic_id) = request.epic_id {
        patch = patch.with_epic(epic_id);
    }
    if let Some(priority) = request.priority {
        patch = patch.with_priority(TaskPriority::try_from(priority.as_str())?);
    }
    if let Some(deadline) = request.deadline {
        patch = patch.with_deadline(deadline);
    }
    if let Some(assignees) = request.assignees {
        patch = patch.with_assignees(assignees);
    }
    Ok(patch)
}
