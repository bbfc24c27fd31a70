//! Then steps for task status workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::then;
use trackboard::task::{
    domain::{ActivityHistory, Task, TaskDomainError, TaskStatus},
    services::TaskLifecycleError,
};

fn stored_task(world: &TaskWorkflowWorld) -> Result<Task, eyre::Report> {
    let task_id = world.task()?.id();
    run_async(world.service.find_by_id(task_id))
        .wrap_err("reload task")?
        .ok_or_else(|| eyre::eyre!("task {task_id} is missing from the repository"))
}

fn history(world: &TaskWorkflowWorld) -> Result<ActivityHistory, eyre::Report> {
    let task_id = world.task()?.id();
    run_async(world.service.activity_history(task_id)).wrap_err("load activity history")
}

fn parse_status(raw: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(raw).map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskWorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = parse_status(&status)?;
    let task = stored_task(world)?;
    eyre::ensure!(
        task.status() == expected,
        "expected status {expected}, found {}",
        task.status()
    );
    Ok(())
}

#[then("the accumulated work time is {seconds:u64} seconds")]
fn accumulated_work_time_is(world: &TaskWorkflowWorld, seconds: u64) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    eyre::ensure!(
        task.accumulated_work_seconds() == seconds,
        "expected {seconds}s of work, found {}s",
        task.accumulated_work_seconds()
    );
    Ok(())
}

#[then("the task has a review stamp")]
fn has_review_stamp(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    eyre::ensure!(task.reviewed().is_some(), "expected a review stamp");
    Ok(())
}

#[then("the task has no review stamp")]
fn has_no_review_stamp(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    eyre::ensure!(task.reviewed().is_none(), "expected the review stamp to be cleared");
    Ok(())
}

#[then("the task has a completion stamp")]
fn has_completion_stamp(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    let completed = task
        .completed()
        .ok_or_else(|| eyre::eyre!("expected a completion stamp"))?;
    eyre::ensure!(
        completed.by() == world.manager.user_id(),
        "completion should be stamped by the manager"
    );
    Ok(())
}

#[then("the task has no start stamp")]
fn has_no_start_stamp(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    eyre::ensure!(task.started().is_none(), "expected the start stamp to be cleared");
    Ok(())
}

#[then("the transition is refused as forbidden")]
fn refused_as_forbidden(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_transition_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?;
    if !matches!(
        result,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::CompletionForbidden { .. }
        ))
    ) {
        return Err(eyre::eyre!("expected CompletionForbidden, got {result:?}"));
    }
    Ok(())
}

#[then("the transition is refused as an invalid status")]
fn refused_as_invalid_status(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_transition_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?;
    if !matches!(result, Err(TaskLifecycleError::InvalidStatus(_))) {
        return Err(eyre::eyre!("expected InvalidStatus, got {result:?}"));
    }
    Ok(())
}

#[then("the activity trail has {count:usize} entries")]
fn activity_trail_has(world: &TaskWorkflowWorld, count: usize) -> Result<(), eyre::Report> {
    let entries = history(world)?;
    eyre::ensure!(
        entries.len() == count,
        "expected {count} activity entries, found {}",
        entries.len()
    );
    Ok(())
}

#[then(r#"the latest activity moved the task from "{from}" to "{to}""#)]
fn latest_activity_moved(
    world: &TaskWorkflowWorld,
    from: String,
    to: String,
) -> Result<(), eyre::Report> {
    let expected_from = parse_status(&from)?;
    let expected_to = parse_status(&to)?;
    let entries = history(world)?;
    let latest = entries
        .latest()
        .ok_or_else(|| eyre::eyre!("activity trail is empty"))?;
    eyre::ensure!(
        latest.old_status() == Some(expected_from) && latest.new_status() == expected_to,
        "latest activity was {:?} -> {}",
        latest.old_status(),
        latest.new_status()
    );
    Ok(())
}

#[then(r#"notifications were sent for "{first}" and "{second}""#)]
fn notifications_were_sent(
    world: &TaskWorkflowWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let expected = vec![parse_status(&first)?, parse_status(&second)?];
    let delivered: Vec<TaskStatus> = world
        .notifier
        .delivered()
        .iter()
        .map(|notification| notification.new_status)
        .collect();
    eyre::ensure!(
        delivered == expected,
        "expected notifications for {expected:?}, found {delivered:?}"
    );
    Ok(())
}
