//! Unit tests for dependency gating, progress and plan lifecycle.

use crate::task::domain::{
    BlockedTask, DependencyUnresolved, PlanStatus, PlannedTask, SchedulerPoll, TaskDomainError,
    TaskGraph, TaskId, TaskPriority, TaskSpec, TaskStatus, TransitionPayload,
};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

fn id(value: u64) -> TaskId {
    TaskId::new(value)
}

fn run(graph: &mut TaskGraph, task: TaskId, outcome: TaskStatus) -> Result<(), TaskDomainError> {
    graph.transition(task, TaskStatus::Running, TransitionPayload::none(), &DefaultClock)?;
    graph.transition(task, outcome, TransitionPayload::none(), &DefaultClock)?;
    Ok(())
}

/// `A`, `B` after `A`, `C` after `A`.
#[fixture]
fn fan_out_graph() -> TaskGraph {
    let mut graph = TaskGraph::new();
    graph
        .create_plan(
            "fan out",
            vec![
                PlannedTask::new("A"),
                PlannedTask::new("B").after([0]),
                PlannedTask::new("C").after([0]),
            ],
            &DefaultClock,
        )
        .expect("plan should be created");
    graph
}

#[rstest]
fn dependencies_gate_in_insertion_order(mut fan_out_graph: TaskGraph) -> eyre::Result<()> {
    ensure!(fan_out_graph.next_runnable().map(|task| task.name()) == Some("A"));

    run(&mut fan_out_graph, id(1), TaskStatus::Completed)?;

    ensure!(fan_out_graph.next_runnable().map(|task| task.name()) == Some("B"));
    run(&mut fan_out_graph, id(2), TaskStatus::Completed)?;
    ensure!(fan_out_graph.next_runnable().map(|task| task.name()) == Some("C"));
    Ok(())
}

#[rstest]
fn running_dependency_does_not_release_dependents(
    mut fan_out_graph: TaskGraph,
) -> eyre::Result<()> {
    fan_out_graph.transition(id(1), TaskStatus::Running, TransitionPayload::none(), &DefaultClock)?;

    ensure!(fan_out_graph.next_runnable().is_none());
    ensure!(fan_out_graph.poll() == SchedulerPoll::Busy { task: id(1) });
    Ok(())
}

#[rstest]
fn progress_rounds_completed_share(mut fan_out_graph: TaskGraph) -> eyre::Result<()> {
    fan_out_graph.add_task(TaskSpec::new("D"), &DefaultClock)?;
    fan_out_graph.add_task(TaskSpec::new("E"), &DefaultClock)?;
    run(&mut fan_out_graph, id(1), TaskStatus::Completed)?;
    run(&mut fan_out_graph, id(2), TaskStatus::Completed)?;

    let progress = fan_out_graph.progress();

    ensure!(progress.total == 5);
    ensure!(progress.completed == 2);
    ensure!(progress.pending == 3);
    ensure!(progress.percent_complete == 40);
    Ok(())
}

#[rstest]
#[case(0, 0, 0)]
#[case(1, 3, 33)]
#[case(2, 3, 67)]
#[case(1, 8, 13)]
#[case(3, 3, 100)]
fn percent_complete_rounds_to_nearest(
    #[case] completed: u64,
    #[case] total: u64,
    #[case] expected: u8,
) -> eyre::Result<()> {
    let mut graph = TaskGraph::new();
    for index in 0..total {
        graph.add_task(TaskSpec::new(format!("task {index}")), &DefaultClock)?;
    }
    for index in 0..completed {
        run(&mut graph, id(index + 1), TaskStatus::Completed)?;
    }

    ensure!(graph.progress().percent_complete == expected);
    Ok(())
}

#[rstest]
fn completion_counts_skipped_tasks_as_terminal() -> eyre::Result<()> {
    let mut graph = TaskGraph::new();
    graph.create_plan(
        "five",
        (0..5).map(|index| PlannedTask::new(format!("t{index}"))).collect(),
        &DefaultClock,
    )?;

    for task in 1..=3 {
        run(&mut graph, id(task), TaskStatus::Completed)?;
        ensure!(!graph.is_complete());
    }
    graph.transition(id(4), TaskStatus::Skipped, TransitionPayload::none(), &DefaultClock)?;
    ensure!(!graph.is_complete());
    graph.transition(id(5), TaskStatus::Skipped, TransitionPayload::none(), &DefaultClock)?;

    ensure!(graph.is_complete());
    ensure!(graph.poll() == SchedulerPoll::Complete);
    ensure!(graph.plan().map(|plan| plan.status()) == Some(PlanStatus::Completed));
    Ok(())
}

#[rstest]
fn failed_dependency_stalls_the_plan(mut fan_out_graph: TaskGraph) -> eyre::Result<()> {
    run(&mut fan_out_graph, id(1), TaskStatus::Failed)?;

    let expected = SchedulerPoll::Stalled(DependencyUnresolved {
        blocked: vec![
            BlockedTask {
                task: id(2),
                waiting_on: vec![id(1)],
            },
            BlockedTask {
                task: id(3),
                waiting_on: vec![id(1)],
            },
        ],
    });

    ensure!(fan_out_graph.next_runnable().is_none());
    ensure!(!fan_out_graph.is_complete());
    ensure!(fan_out_graph.poll() == expected);
    ensure!(fan_out_graph.plan().map(|plan| plan.status()) == Some(PlanStatus::Active));
    Ok(())
}

#[rstest]
fn skip_blocked_follows_dependency_chains() -> eyre::Result<()> {
    let mut graph = TaskGraph::new();
    graph.create_plan(
        "chain",
        vec![
            PlannedTask::new("fetch"),
            PlannedTask::new("parse").after([0]),
            PlannedTask::new("report").after([1]),
            PlannedTask::new("unrelated"),
        ],
        &DefaultClock,
    )?;
    run(&mut graph, id(1), TaskStatus::Failed)?;

    let skipped = graph.skip_blocked(&DefaultClock);

    ensure!(skipped == vec![id(2), id(3)]);
    ensure!(graph.task(id(3)).and_then(|task| task.error()).is_some());
    ensure!(graph.poll() == SchedulerPoll::Ready { task: id(4) });
    run(&mut graph, id(4), TaskStatus::Completed)?;
    ensure!(graph.plan().map(|plan| plan.status()) == Some(PlanStatus::Failed));
    Ok(())
}

#[rstest]
fn plan_dependencies_may_point_forward() -> eyre::Result<()> {
    let mut graph = TaskGraph::new();
    graph.create_plan(
        "forward",
        vec![PlannedTask::new("late").after([1]), PlannedTask::new("early")],
        &DefaultClock,
    )?;

    ensure!(graph.next_runnable().map(|task| task.name()) == Some("early"));
    Ok(())
}

#[rstest]
#[case::self_loop(vec![PlannedTask::new("a").after([0])], vec![0])]
#[case::pair(
    vec![PlannedTask::new("a").after([1]), PlannedTask::new("b").after([0])],
    vec![0, 1]
)]
#[case::behind_a_root(
    vec![
        PlannedTask::new("root"),
        PlannedTask::new("x").after([0, 2]),
        PlannedTask::new("y").after([1]),
    ],
    vec![1, 2]
)]
fn cyclic_plans_are_rejected(#[case] planned: Vec<PlannedTask>, #[case] positions: Vec<u64>) {
    let mut graph = TaskGraph::new();
    graph
        .add_task(TaskSpec::new("existing"), &DefaultClock)
        .expect("task should be added");
    let before = graph.clone();
    // One task already holds id 1, so plan position 0 becomes id 2.
    let expected: Vec<TaskId> = positions.into_iter().map(|position| id(position + 2)).collect();

    let result = graph.create_plan("cyclic", planned, &DefaultClock).map(|_| ());

    assert_eq!(result, Err(TaskDomainError::DependencyCycle(expected)));
    assert_eq!(graph, before);
}

#[rstest]
fn out_of_range_position_is_rejected() {
    let mut graph = TaskGraph::new();

    let result = graph
        .create_plan(
            "bad",
            vec![PlannedTask::new("a").after([4])],
            &DefaultClock,
        )
        .map(|_| ());

    assert_eq!(
        result,
        Err(TaskDomainError::DependencyPositionOutOfRange {
            task: "a".to_owned(),
            position: 4,
            len: 1,
        })
    );
    assert!(graph.plan().is_none());
}

#[rstest]
fn add_task_rejects_unknown_dependency(mut fan_out_graph: TaskGraph) {
    let before = fan_out_graph.clone();

    let result = fan_out_graph
        .add_task(TaskSpec::new("late").depends_on([id(1), id(42)]), &DefaultClock)
        .map(|task| task.id());

    assert_eq!(
        result,
        Err(TaskDomainError::UnknownDependency {
            task: "late".to_owned(),
            dependency: id(42),
        })
    );
    assert_eq!(fan_out_graph, before);
}

#[rstest]
#[case("")]
#[case("   ")]
fn empty_task_names_are_rejected(#[case] name: &str) {
    let mut graph = TaskGraph::new();

    let result = graph.add_task(TaskSpec::new(name), &DefaultClock).map(|task| task.id());

    assert_eq!(result, Err(TaskDomainError::EmptyTaskName));
}

#[rstest]
fn add_task_keeps_declared_fields(mut fan_out_graph: TaskGraph) -> eyre::Result<()> {
    let task = fan_out_graph.add_task(
        TaskSpec::new("  publish ")
            .with_description("upload artefacts")
            .with_priority(TaskPriority::High)
            .depends_on([id(2), id(3), id(2)]),
        &DefaultClock,
    )?;

    ensure!(task.id() == id(4));
    ensure!(task.name() == "publish");
    ensure!(task.description() == Some("upload artefacts"));
    ensure!(task.priority() == TaskPriority::High);
    ensure!(task.dependencies() == [id(2), id(3)]);
    ensure!(task.status() == TaskStatus::Pending);
    Ok(())
}

#[rstest]
fn new_plan_replaces_tasks_but_not_the_id_counter(mut fan_out_graph: TaskGraph) -> eyre::Result<()> {
    let previous_plan = fan_out_graph.plan().map(|plan| plan.id());

    fan_out_graph.create_plan("second", vec![PlannedTask::new("again")], &DefaultClock)?;

    ensure!(fan_out_graph.tasks().len() == 1);
    ensure!(fan_out_graph.tasks().first().map(|task| task.id()) == Some(id(4)));
    ensure!(fan_out_graph.plan().map(|plan| plan.id()) != previous_plan);
    ensure!(fan_out_graph.task(id(1)).is_none());
    Ok(())
}

#[rstest]
fn reset_clears_everything_and_restarts_ids(mut fan_out_graph: TaskGraph) -> eyre::Result<()> {
    fan_out_graph.reset();

    ensure!(fan_out_graph.tasks().is_empty());
    ensure!(fan_out_graph.plan().is_none());
    ensure!(fan_out_graph.progress().percent_complete == 0);
    let task = fan_out_graph.add_task(TaskSpec::new("fresh"), &DefaultClock)?;
    ensure!(task.id() == id(1));
    Ok(())
}

#[rstest]
fn appending_to_a_finished_plan_reactivates_it() -> eyre::Result<()> {
    let mut graph = TaskGraph::new();
    graph.create_plan("one", vec![PlannedTask::new("only")], &DefaultClock)?;
    run(&mut graph, id(1), TaskStatus::Completed)?;
    ensure!(graph.plan().map(|plan| plan.status()) == Some(PlanStatus::Completed));

    graph.add_task(TaskSpec::new("follow-up").depends_on([id(1)]), &DefaultClock)?;

    ensure!(graph.plan().map(|plan| plan.status()) == Some(PlanStatus::Active));
    ensure!(graph.poll() == SchedulerPoll::Ready { task: id(2) });
    Ok(())
}

#[rstest]
fn graphs_built_through_operations_are_consistent(
    mut fan_out_graph: TaskGraph,
) -> eyre::Result<()> {
    ensure!(fan_out_graph.is_consistent());
    fan_out_graph.add_task(TaskSpec::new("D").depends_on([id(2), id(3)]), &DefaultClock)?;
    ensure!(fan_out_graph.is_consistent());
    ensure!(TaskGraph::new().is_consistent());
    Ok(())
}
