//! In-memory repository for task workflow tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{ActivityHistory, ProjectId, Task, TaskActivity, TaskId, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    activities: HashMap<TaskId, Vec<TaskActivity>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Checks that `task` exists with the expected version.
fn check_version(
    state: &InMemoryTaskState,
    task_id: TaskId,
    expected_version: u64,
) -> TaskRepositoryResult<()> {
    let stored = state
        .tasks
        .get(&task_id)
        .ok_or(TaskRepositoryError::NotFound(task_id))?;
    if stored.version() != expected_version {
        return Err(TaskRepositoryError::VersionConflict {
            task_id,
            expected: expected_version,
            actual: stored.version(),
        });
    }
    Ok(())
}

/// Collects tasks matching `predicate`, oldest first.
fn collect_sorted(state: &InMemoryTaskState, predicate: impl Fn(&Task) -> bool) -> Vec<Task> {
    let mut found: Vec<Task> = state
        .tasks
        .values()
        .filter(|task| predicate(task))
        .cloned()
        .collect();
    found.sort_by_key(|task| (task.created_at(), task.id().into_inner()));
    found
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task, created: &TaskActivity) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        state
            .activities
            .entry(task.id())
            .or_default()
            .push(created.clone());
        Ok(())
    }

    async fn update_details(
        &self,
        task: &Task,
        expected_version: u64,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        check_version(&state, task.id(), expected_version)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn commit_transition(
        &self,
        task: &Task,
        activity: &TaskActivity,
        expected_version: u64,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        check_version(&state, task.id(), expected_version)?;
        state.tasks.insert(task.id(), task.clone());
        state
            .activities
            .entry(task.id())
            .or_default()
            .push(activity.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(collect_sorted(&state, |task| task.project_id() == project_id))
    }

    async fn find_assigned_to(&self, user_id: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(collect_sorted(&state, |task| task.is_assigned_to(user_id)))
    }

    async fn activity_history(&self, id: TaskId) -> TaskRepositoryResult<ActivityHistory> {
        let state = self.read()?;
        let appended = state.activities.get(&id).cloned().unwrap_or_default();
        Ok(ActivityHistory::from_appended(appended))
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.remove(&id).is_none() {
            return Err(TaskRepositoryError::NotFound(id));
        }
        state.activities.remove(&id);
        Ok(())
    }
}
