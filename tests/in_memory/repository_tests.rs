//! Repository contract tests for [`InMemoryTaskRepository`].

use crate::in_memory::helpers::{at, manager, repo, task_in};
use rstest::rstest;
use trackboard::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Actor, ProjectId, TaskStatus, UserId, lifecycle},
    ports::{TaskRepository, TaskRepositoryError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_task_id_is_rejected(repo: InMemoryTaskRepository, manager: Actor) {
    let task = task_in(ProjectId::new(), "Original", &manager, at(0), &[]);
    let created = lifecycle::on_create(&task, &manager, at(0));
    repo.store(&task, &created).await.expect("first store");

    let result = repo.store(&task, &created).await;

    assert!(matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commit_with_stale_version_writes_nothing(repo: InMemoryTaskRepository, manager: Actor) {
    let task = task_in(ProjectId::new(), "Contended", &manager, at(0), &[]);
    repo.store(&task, &lifecycle::on_create(&task, &manager, at(0)))
        .await
        .expect("store");

    let first = lifecycle::transition(&task, TaskStatus::InProgress, &manager, at(10))
        .expect("first transition");
    repo.commit_transition(first.task(), first.activity(), task.version())
        .await
        .expect("first writer wins");

    let second = lifecycle::transition(&task, TaskStatus::Done, &manager, at(11))
        .expect("second transition");
    let result = repo
        .commit_transition(second.task(), second.activity(), task.version())
        .await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::VersionConflict { expected: 0, actual: 1, .. })
    ));
    let stored = repo
        .find_by_id(task.id())
        .await
        .expect("lookup")
        .expect("task exists");
    assert_eq!(stored.status(), TaskStatus::InProgress);
    let history = repo.activity_history(task.id()).await.expect("history");
    assert_eq!(history.len(), 2, "the losing activity must not be appended");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commit_for_unknown_task_is_not_found(repo: InMemoryTaskRepository, manager: Actor) {
    let task = task_in(ProjectId::new(), "Ghost", &manager, at(0), &[]);
    let transition = lifecycle::transition(&task, TaskStatus::InProgress, &manager, at(1))
        .expect("transition");

    let result = repo
        .commit_transition(transition.task(), transition.activity(), 0)
        .await;

    assert!(matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == task.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_of_unknown_task_is_empty(repo: InMemoryTaskRepository, manager: Actor) {
    let task = task_in(ProjectId::new(), "Never stored", &manager, at(0), &[]);

    let history = repo.activity_history(task.id()).await.expect("history");

    assert!(history.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lookups_filter_by_project_and_assignee(repo: InMemoryTaskRepository, manager: Actor) {
    let project = ProjectId::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let older = task_in(project, "Older", &manager, at(0), &[alice]);
    let newer = task_in(project, "Newer", &manager, at(5), &[alice, bob]);
    let elsewhere = task_in(ProjectId::new(), "Elsewhere", &manager, at(1), &[bob]);
    for task in [&newer, &elsewhere, &older] {
        repo.store(task, &lifecycle::on_create(task, &manager, task.created_at()))
            .await
            .expect("store");
    }

    let in_project = repo.find_by_project(project).await.expect("project lookup");
    let for_alice = repo.find_assigned_to(alice).await.expect("alice lookup");
    let for_bob = repo.find_assigned_to(bob).await.expect("bob lookup");

    assert_eq!(in_project, vec![older.clone(), newer.clone()]);
    assert_eq!(for_alice, vec![older, newer.clone()]);
    assert_eq!(for_bob, vec![elsewhere, newer]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_cascades_to_activity(repo: InMemoryTaskRepository, manager: Actor) {
    let task = task_in(ProjectId::new(), "Disposable", &manager, at(0), &[]);
    repo.store(&task, &lifecycle::on_create(&task, &manager, at(0)))
        .await
        .expect("store");

    repo.delete(task.id()).await.expect("delete");

    assert_eq!(repo.find_by_id(task.id()).await.expect("lookup"), None);
    assert!(repo.activity_history(task.id()).await.expect("history").is_empty());
    assert!(matches!(
        repo.delete(task.id()).await,
        Err(TaskRepositoryError::NotFound(_))
    ));
}
