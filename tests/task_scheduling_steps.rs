//! Behaviour tests for dependency-gated task scheduling.

#[path = "task_scheduling_steps/mod.rs"]
mod task_scheduling_steps_defs;

use rstest_bdd_macros::scenario;
use task_scheduling_steps_defs::world::{SchedulingWorld, world};

#[scenario(
    path = "tests/features/task_scheduling.feature",
    name = "A dependent task waits for its dependency"
)]
#[tokio::test(flavor = "multi_thread")]
async fn dependent_task_waits(world: SchedulingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_scheduling.feature",
    name = "A failed dependency stalls its dependents"
)]
#[tokio::test(flavor = "multi_thread")]
async fn failed_dependency_stalls(world: SchedulingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_scheduling.feature",
    name = "Skipping blocked tasks finishes the plan as failed"
)]
#[tokio::test(flavor = "multi_thread")]
async fn skipping_blocked_tasks(world: SchedulingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_scheduling.feature",
    name = "A completed task cannot be restarted"
)]
#[tokio::test(flavor = "multi_thread")]
async fn completed_task_cannot_restart(world: SchedulingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_scheduling.feature",
    name = "The persisted snapshot follows every change"
)]
#[tokio::test(flavor = "multi_thread")]
async fn snapshot_follows_changes(world: SchedulingWorld) {
    let _ = world;
}
