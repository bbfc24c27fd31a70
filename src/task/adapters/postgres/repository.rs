//! `PostgreSQL` repository implementation for task workflow storage.

use super::{
    conversion::{
        row_to_activity, row_to_task, to_activity_row, to_assignee_rows, to_changeset,
        to_new_row, version_from_column, version_to_column,
    },
    models::{ActivityRow, AssigneeRow, TaskChangeset, TaskRow},
    schema::{task_activity, task_assignees, tasks},
};
use crate::task::{
    domain::{ActivityHistory, ProjectId, Task, TaskActivity, TaskId, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
///
/// Every operation runs on the blocking thread pool; multi-row writes run
/// inside a single transaction.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task, created: &TaskActivity) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;
        let assignee_rows = to_assignee_rows(task)?;
        let activity_row = to_activity_row(created);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                insert_assignees(tx, &assignee_rows)?;
                diesel::insert_into(task_activity::table)
                    .values(&activity_row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn update_details(
        &self,
        task: &Task,
        expected_version: u64,
    ) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = to_changeset(task)?;
        let assignee_rows = to_assignee_rows(task)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                guarded_update(tx, task_id, &changeset, expected_version)?;
                diesel::delete(
                    task_assignees::table.filter(task_assignees::task_id.eq(task_id.into_inner())),
                )
                .execute(tx)?;
                insert_assignees(tx, &assignee_rows)?;
                Ok(())
            })
        })
        .await
    }

    async fn commit_transition(
        &self,
        task: &Task,
        activity: &TaskActivity,
        expected_version: u64,
    ) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = to_changeset(task)?;
        let activity_row = to_activity_row(activity);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                guarded_update(tx, task_id, &changeset, expected_version)?;
                diesel::insert_into(task_activity::table)
                    .values(&activity_row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            let Some(task_row) = row else {
                return Ok(None);
            };
            let mut assignees = load_assignees(connection, &[task_row.id])?;
            let users = assignees.remove(&task_row.id).unwrap_or_default();
            row_to_task(task_row, users).map(Some)
        })
        .await
    }

    async fn find_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::project_id.eq(project_id.into_inner()))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows_to_tasks(connection, rows)
        })
        .await
    }

    async fn find_assigned_to(&self, user_id: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let assigned = task_assignees::table
                .filter(task_assignees::user_id.eq(user_id.into_inner()))
                .select(task_assignees::task_id);
            let rows = tasks::table
                .filter(tasks::id.eq_any(assigned))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows_to_tasks(connection, rows)
        })
        .await
    }

    async fn activity_history(&self, id: TaskId) -> TaskRepositoryResult<ActivityHistory> {
        self.run_blocking(move |connection| {
            let rows = task_activity::table
                .filter(task_activity::task_id.eq(id.into_inner()))
                .order((task_activity::timestamp.asc(), task_activity::sequence.asc()))
                .select(ActivityRow::as_select())
                .load::<ActivityRow>(connection)?;
            let activities = rows
                .into_iter()
                .map(row_to_activity)
                .collect::<TaskRepositoryResult<Vec<_>>>()?;
            Ok(ActivityHistory::from_appended(activities))
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            // Assignee and activity rows go with the task via ON DELETE CASCADE.
            let deleted = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .execute(connection)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

/// Writes `changeset` only if the stored version still equals
/// `expected_version`, reporting why the write was refused otherwise.
fn guarded_update(
    connection: &mut PgConnection,
    task_id: TaskId,
    changeset: &TaskChangeset,
    expected_version: u64,
) -> TaskRepositoryResult<()> {
    let expected = version_to_column(expected_version)?;
    let updated = diesel::update(
        tasks::table
            .filter(tasks::id.eq(task_id.into_inner()))
            .filter(tasks::version.eq(expected)),
    )
    .set(changeset)
    .execute(connection)?;
    if updated == 1 {
        return Ok(());
    }

    let stored_version = tasks::table
        .filter(tasks::id.eq(task_id.into_inner()))
        .select(tasks::version)
        .first::<i64>(connection)
        .optional()?;
    match stored_version {
        None => Err(TaskRepositoryError::NotFound(task_id)),
        Some(actual) => Err(TaskRepositoryError::VersionConflict {
            task_id,
            expected: expected_version,
            actual: version_from_column(actual)?,
        }),
    }
}

fn insert_assignees(
    connection: &mut PgConnection,
    rows: &[AssigneeRow],
) -> TaskRepositoryResult<()> {
    if rows.is_empty() {
        return Ok(());
    }
    diesel::insert_into(task_assignees::table)
        .values(rows)
        .execute(connection)?;
    Ok(())
}

/// Loads assignees for the given tasks, keyed by task, in position order.
fn load_assignees(
    connection: &mut PgConnection,
    task_ids: &[Uuid],
) -> TaskRepositoryResult<HashMap<Uuid, Vec<Uuid>>> {
    let rows = task_assignees::table
        .filter(task_assignees::task_id.eq_any(task_ids))
        .order((task_assignees::task_id.asc(), task_assignees::position.asc()))
        .select(AssigneeRow::as_select())
        .load::<AssigneeRow>(connection)?;

    let mut by_task: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for row in rows {
        by_task.entry(row.task_id).or_default().push(row.user_id);
    }
    Ok(by_task)
}

fn rows_to_tasks(
    connection: &mut PgConnection,
    rows: Vec<TaskRow>,
) -> TaskRepositoryResult<Vec<Task>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut assignees = load_assignees(connection, &ids)?;
    rows.into_iter()
        .map(|row| {
            let users = assignees.remove(&row.id).unwrap_or_default();
            row_to_task(row, users)
        })
        .collect()
}
