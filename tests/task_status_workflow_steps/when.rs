//! When steps for task status workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use rstest_bdd_macros::when;
use trackboard::task::services::TransitionTaskRequest;

/// Requests a transition and records the outcome in the world.
pub fn move_task(
    world: &mut TaskWorkflowWorld,
    role: &str,
    status: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(role)?;
    let task_id = world.task()?.id();

    let result = run_async(
        world
            .service
            .transition_task(TransitionTaskRequest::new(task_id, status), actor),
    );
    if let Ok(ref updated) = result {
        world.task = Some(updated.clone());
    }
    world.last_transition_result = Some(result);
    Ok(())
}

/// Advances the scenario clock.
pub fn pass_time(world: &TaskWorkflowWorld, seconds: i64) {
    world.clock.advance(seconds);
}

#[when(r#"a {role} moves the task to "{status}""#)]
fn task_is_moved(
    world: &mut TaskWorkflowWorld,
    role: String,
    status: String,
) -> Result<(), eyre::Report> {
    move_task(world, &role, status)
}

#[when("{seconds:i64} seconds pass")]
fn time_passes(world: &mut TaskWorkflowWorld, seconds: i64) {
    pass_time(world, seconds);
}
