//! Then steps for task scheduling BDD scenarios.

use std::sync::Arc;

use super::world::{SchedulingWorld, TestPlanService, run_async};
use armature::task::{
    adapters::StoreTaskSnapshotRepository,
    domain::{PlanStatus, SchedulerPoll, TaskDomainError, TaskStatus},
    services::{TaskPlanError, TaskPlanService},
};
use eyre::{WrapErr, bail, eyre};
use mockable::DefaultClock;
use rstest_bdd_macros::then;

#[then(r#"the next runnable task is "{name}""#)]
fn next_runnable_is(world: &SchedulingWorld, name: String) -> Result<(), eyre::Report> {
    let expected = world.task_id(&name)?;
    match run_async(world.plans.poll()) {
        SchedulerPoll::Ready { task } if task == expected => Ok(()),
        other => Err(eyre!("expected '{name}' to be ready, scheduler reported {other:?}")),
    }
}

#[then(r#"the scheduler is busy with "{name}""#)]
fn scheduler_busy_with(world: &SchedulingWorld, name: String) -> Result<(), eyre::Report> {
    let expected = world.task_id(&name)?;
    match run_async(world.plans.poll()) {
        SchedulerPoll::Busy { task } if task == expected => Ok(()),
        other => Err(eyre!("expected busy with '{name}', scheduler reported {other:?}")),
    }
}

#[then(r#"the scheduler is stalled with "{name}" blocked"#)]
fn scheduler_stalled_with(world: &SchedulingWorld, name: String) -> Result<(), eyre::Report> {
    let expected = world.task_id(&name)?;
    let SchedulerPoll::Stalled(unresolved) = run_async(world.plans.poll()) else {
        bail!("expected the scheduler to stall");
    };
    if !unresolved.blocked.iter().any(|entry| entry.task == expected) {
        bail!("expected '{name}' among blocked tasks, found {unresolved:?}");
    }
    Ok(())
}

#[then("the scheduler reports the graph complete")]
fn scheduler_complete(world: &SchedulingWorld) -> Result<(), eyre::Report> {
    match run_async(world.plans.poll()) {
        SchedulerPoll::Complete => Ok(()),
        other => Err(eyre!("expected a complete graph, scheduler reported {other:?}")),
    }
}

#[then("progress is {completed:usize} of {total:usize} completed at {percent:u8} percent")]
fn progress_is(
    world: &SchedulingWorld,
    completed: usize,
    total: usize,
    percent: u8,
) -> Result<(), eyre::Report> {
    let progress = run_async(world.plans.progress());
    if progress.completed != completed
        || progress.total != total
        || progress.percent_complete != percent
    {
        bail!("unexpected progress {progress:?}");
    }
    Ok(())
}

#[then(r#"task "{name}" is "{status}""#)]
fn task_status_is(world: &SchedulingWorld, name: String, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre!("invalid expected status in scenario: {err}"))?;
    let task = world.task(&name)?;
    if task.status() != expected {
        bail!("expected '{name}' to be {expected}, found {}", task.status());
    }
    Ok(())
}

#[then(r#"task "{name}" has error "{message}""#)]
fn task_has_error(world: &SchedulingWorld, name: String, message: String) -> Result<(), eyre::Report> {
    let task = world.task(&name)?;
    if task.error() != Some(message.as_str()) {
        bail!("expected error '{message}' on '{name}', found {:?}", task.error());
    }
    Ok(())
}

#[then(r#"the plan is "{status}""#)]
fn plan_status_is(world: &SchedulingWorld, status: String) -> Result<(), eyre::Report> {
    let expected = PlanStatus::try_from(status.as_str())
        .map_err(|err| eyre!("invalid expected plan status in scenario: {err}"))?;
    let graph = run_async(world.plans.snapshot());
    let plan = graph.plan().ok_or_else(|| eyre!("missing plan"))?;
    if plan.status() != expected {
        bail!("expected plan {expected}, found {}", plan.status());
    }
    Ok(())
}

#[then("the transition is rejected as invalid")]
fn transition_rejected(world: &SchedulingWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_transition
        .as_ref()
        .ok_or_else(|| eyre!("missing transition result"))?;
    if !matches!(
        result,
        Err(TaskPlanError::Domain(TaskDomainError::InvalidTransition { .. }))
    ) {
        bail!("expected an invalid transition error, got {result:?}");
    }
    Ok(())
}

#[then("restoring from the store yields the current graph")]
fn restored_graph_matches(world: &SchedulingWorld) -> Result<(), eyre::Report> {
    let restored: TestPlanService = run_async(TaskPlanService::restore(
        Arc::new(StoreTaskSnapshotRepository::new(Arc::clone(&world.store))),
        Arc::new(DefaultClock),
    ))
    .wrap_err("restore plan service from store")?;
    if run_async(restored.snapshot()) != run_async(world.plans.snapshot()) {
        bail!("restored graph differs from the live graph");
    }
    Ok(())
}
