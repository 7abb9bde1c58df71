//! Given steps for task scheduling BDD scenarios.

use super::world::{SchedulingWorld, run_async};
use armature::task::domain::TaskSpec;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a plan "{description}""#)]
fn a_plan(world: &mut SchedulingWorld, description: String) -> Result<(), eyre::Report> {
    run_async(world.plans.create_plan(description, Vec::new())).wrap_err("create plan")?;
    Ok(())
}

#[given(r#"an independent task "{name}""#)]
fn an_independent_task(world: &mut SchedulingWorld, name: String) -> Result<(), eyre::Report> {
    let task = run_async(world.plans.add_task(TaskSpec::new(name.as_str())))
        .wrap_err("add task in scenario setup")?;
    world.task_ids.insert(name, task.id());
    Ok(())
}

#[given(r#"a task "{name}" depending on "{dependency}""#)]
fn a_dependent_task(
    world: &mut SchedulingWorld,
    name: String,
    dependency: String,
) -> Result<(), eyre::Report> {
    let dependency_id = world.task_id(&dependency)?;
    let new_task = TaskSpec::new(name.as_str()).depends_on([dependency_id]);
    let task = run_async(world.plans.add_task(new_task)).wrap_err("add dependent task")?;
    world.task_ids.insert(name, task.id());
    Ok(())
}
