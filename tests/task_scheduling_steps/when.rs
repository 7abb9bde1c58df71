//! When steps for task scheduling BDD scenarios.

use super::world::{SchedulingWorld, run_async};
use armature::task::domain::{TaskStatus, TransitionPayload};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use serde_json::json;

fn transition(
    world: &mut SchedulingWorld,
    name: &str,
    target: TaskStatus,
    payload: TransitionPayload,
) -> Result<(), eyre::Report> {
    let id = world.task_id(name)?;
    let result = run_async(world.plans.transition(id, target, payload));
    world.last_transition = Some(result);
    Ok(())
}

#[when(r#"task "{name}" starts"#)]
fn task_starts(world: &mut SchedulingWorld, name: String) -> Result<(), eyre::Report> {
    transition(world, &name, TaskStatus::Running, TransitionPayload::none())
}

#[when(r#"task "{name}" completes"#)]
fn task_completes(world: &mut SchedulingWorld, name: String) -> Result<(), eyre::Report> {
    let payload = TransitionPayload::result(json!({ "task": name.as_str() }));
    transition(world, &name, TaskStatus::Completed, payload)
}

#[when(r#"task "{name}" fails with "{message}""#)]
fn task_fails(
    world: &mut SchedulingWorld,
    name: String,
    message: String,
) -> Result<(), eyre::Report> {
    transition(
        world,
        &name,
        TaskStatus::Failed,
        TransitionPayload::error(message),
    )
}

#[when("blocked tasks are skipped")]
fn blocked_tasks_are_skipped(world: &mut SchedulingWorld) -> Result<(), eyre::Report> {
    run_async(world.plans.skip_blocked()).wrap_err("skip blocked tasks")?;
    Ok(())
}
