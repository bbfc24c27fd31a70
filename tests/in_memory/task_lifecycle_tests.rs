//! In-memory integration tests for task lifecycle operations.

use std::sync::Arc;

use crate::in_memory::helpers::manager;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use trackboard::task::{
    adapters::memory::{InMemoryTaskRepository, RecordingNotifier},
    domain::{ActivityAction, Actor, ProjectId, TaskStatus, UserId, UserRole},
    services::{CreateTaskRequest, TaskLifecycleService, TransitionTaskRequest},
};

type TestService = TaskLifecycleService<InMemoryTaskRepository, DefaultClock>;

#[fixture]
fn service() -> TestService {
    TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(DefaultClock),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_workflow_leaves_a_complete_trail(
    service: TestService,
    manager: Actor,
) -> eyre::Result<()> {
    let developer = Actor::new(UserId::new(), UserRole::User);
    let created = service
        .create_task(
            CreateTaskRequest::new(ProjectId::new(), "Ship the audit trail")
                .with_description("Record every status change")
                .with_assignees([developer.user_id()]),
            manager,
        )
        .await?;

    for (status, actor) in [
        ("in_progress", developer),
        ("for_review", developer),
        ("in_progress", manager),
        ("for_review", developer),
        ("done", manager),
    ] {
        service
            .transition_task(TransitionTaskRequest::new(created.id(), status), actor)
            .await?;
    }

    let done = service
        .find_by_id(created.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task disappeared"))?;
    eyre::ensure!(done.status() == TaskStatus::Done);
    eyre::ensure!(done.version() == 5);
    eyre::ensure!(done.completed().map(|stamp| stamp.by()) == Some(manager.user_id()));
    eyre::ensure!(service.total_time(created.id()).await?.is_some());

    let history = service.activity_history(created.id()).await?;
    let actions: Vec<_> = history.iter().map(|entry| entry.action()).collect();
    eyre::ensure!(history.len() == 6, "expected 6 entries, found {}", history.len());
    eyre::ensure!(actions.first() == Some(&ActivityAction::Created));
    eyre::ensure!(
        actions
            .iter()
            .skip(1)
            .all(|action| *action == ActivityAction::StatusChange)
    );
    let latest = history
        .latest()
        .ok_or_else(|| eyre::eyre!("history is empty"))?;
    eyre::ensure!(latest.old_status() == Some(TaskStatus::ForReview));
    eyre::ensure!(latest.new_status() == TaskStatus::Done);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_transitions_never_lose_activity(manager: Actor) -> eyre::Result<()> {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let notifier = RecordingNotifier::new();
    let service = Arc::new(
        TaskLifecycleService::new(Arc::clone(&repository), Arc::new(DefaultClock))
            .with_notifier(Arc::new(notifier.clone())),
    );
    let created = service
        .create_task(CreateTaskRequest::new(ProjectId::new(), "Hot task"), manager)
        .await?;

    let mut handles = Vec::new();
    for status in ["in_progress", "for_review", "to_do", "in_progress"] {
        let worker = Arc::clone(&service);
        let task_id = created.id();
        handles.push(tokio::spawn(async move {
            worker
                .transition_task(TransitionTaskRequest::new(task_id, status), manager)
                .await
        }));
    }
    let mut committed = 0_usize;
    for handle in handles {
        if handle.await?.is_ok() {
            committed += 1;
        }
    }

    let task = service
        .find_by_id(created.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task disappeared"))?;
    let history = service.activity_history(created.id()).await?;
    eyre::ensure!(committed >= 1, "at least one writer must win");
    eyre::ensure!(history.len() == committed + 1);
    eyre::ensure!(usize::try_from(task.version())? == committed);
    eyre::ensure!(
        history.latest().map(|entry| entry.new_status()) == Some(task.status()),
        "latest activity must match the stored status"
    );
    Ok(())
}
