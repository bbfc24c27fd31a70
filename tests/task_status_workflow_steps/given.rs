//! Given steps for task status workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use super::when::{move_task, pass_time};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use trackboard::task::{domain::ProjectId, services::CreateTaskRequest};

#[given(r#"a manager has created the task "{name}""#)]
fn task_created(world: &mut TaskWorkflowWorld, name: String) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(ProjectId::new(), name)
        .with_assignees([world.member.user_id()]);
    let created = run_async(world.service.create_task(request, world.manager))
        .wrap_err("create task for workflow scenario")?;
    world.task = Some(created);
    Ok(())
}

#[given(r#"a {role} moves the task to "{status}""#)]
fn task_moved(
    world: &mut TaskWorkflowWorld,
    role: String,
    status: String,
) -> Result<(), eyre::Report> {
    move_task(world, &role, status)?;
    world
        .last_transition_result
        .take()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?
        .map(|_| ())
        .wrap_err("transition task in scenario setup")
}

#[given("{seconds:i64} seconds pass")]
fn time_passed(world: &mut TaskWorkflowWorld, seconds: i64) {
    pass_time(world, seconds);
}
