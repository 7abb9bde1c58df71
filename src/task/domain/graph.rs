//! Dependency-gated task graph.

use super::{
    Plan, PlanStatus, PlannedTask, Task, TaskDomainError, TaskId, TaskSpec, TaskStatus,
    TransitionPayload,
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

const FIRST_TASK_ID: u64 = 1;

/// Ordered task list with dependency edges and the active plan.
///
/// Tasks run in insertion order; dependencies only hold a task back until
/// every task it depends on has completed. A dependency that failed or was
/// skipped holds its dependents back indefinitely, which [`TaskGraph::poll`]
/// reports as a stall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGraph {
    plan: Option<Plan>,
    tasks: Vec<Task>,
    next_id: u64,
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self {
            plan: None,
            tasks: Vec::new(),
            next_id: FIRST_TASK_ID,
        }
    }
}

/// Scheduler answer to "what should run now?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SchedulerPoll {
    /// The task can be started.
    Ready {
        /// Task to start.
        task: TaskId,
    },
    /// A task is still running.
    Busy {
        /// Running task.
        task: TaskId,
    },
    /// Every task is terminal.
    Complete,
    /// Pending tasks remain but none can ever run.
    Stalled(DependencyUnresolved),
}

/// Pending tasks that are waiting on dependencies that will not complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyUnresolved {
    /// Blocked tasks in insertion order.
    pub blocked: Vec<BlockedTask>,
}

/// One pending task and the dependencies holding it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedTask {
    /// Pending task.
    pub task: TaskId,
    /// Dependencies that have not completed.
    pub waiting_on: Vec<TaskId>,
}

/// Aggregate task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Number of tasks.
    pub total: usize,
    /// Tasks in [`TaskStatus::Completed`].
    pub completed: usize,
    /// Tasks in [`TaskStatus::Failed`].
    pub failed: usize,
    /// Tasks in [`TaskStatus::Running`].
    pub running: usize,
    /// Tasks in [`TaskStatus::Pending`].
    pub pending: usize,
    /// Tasks in [`TaskStatus::Skipped`].
    pub skipped: usize,
    /// Completed tasks as a rounded percentage of the total, 0 when empty.
    pub percent_complete: u8,
}

impl TaskGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active plan, if any.
    #[must_use]
    pub const fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    /// Returns every task in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the task with `id`.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Returns whether identifiers are unique and below the counter, every
    /// dependency names a task in the graph, and the edges are acyclic.
    ///
    /// Reloaded snapshots failing this check are rejected as corrupt.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        let ids_valid = self.tasks.iter().all(|task| {
            let value = task.id().value();
            (FIRST_TASK_ID..self.next_id).contains(&value) && seen.insert(task.id())
        });
        ids_valid
            && self.tasks.iter().all(|task| {
                task.dependencies()
                    .iter()
                    .all(|dependency| seen.contains(dependency))
            })
            && ensure_acyclic(&self.tasks).is_ok()
    }

    /// Replaces the plan and the whole task list.
    ///
    /// Identifiers continue from the graph's counter. On error the graph is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when a task name is empty, a dependency
    /// position is out of range, or the dependencies form a cycle.
    pub fn create_plan(
        &mut self,
        description: impl Into<String>,
        planned: Vec<PlannedTask>,
        clock: &impl Clock,
    ) -> Result<&Plan, TaskDomainError> {
        let first_id = self.next_id;
        let len = planned.len();
        let mut tasks = Vec::with_capacity(len);
        for (offset, entry) in planned.into_iter().enumerate() {
            let fields = entry.fields.validated()?;
            let mut dependencies = Vec::with_capacity(entry.after.len());
            for position in entry.after {
                if position >= len {
                    return Err(TaskDomainError::DependencyPositionOutOfRange {
                        task: fields.name,
                        position,
                        len,
                    });
                }
                push_unique(&mut dependencies, TaskId::new(first_id + position as u64));
            }
            let id = TaskId::new(first_id + offset as u64);
            tasks.push(Task::new(id, fields, dependencies, clock));
        }
        ensure_acyclic(&tasks)?;

        self.next_id = first_id + len as u64;
        self.tasks = tasks;
        let plan = self.plan.insert(Plan::new(description, clock));
        if len == 0 {
            plan.set_status(PlanStatus::Completed);
        }
        Ok(&*plan)
    }

    /// Appends one pending task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the name is empty or a dependency
    /// does not name an existing task.
    pub fn add_task(&mut self, new_task: TaskSpec, clock: &impl Clock) -> Result<&Task, TaskDomainError> {
        let fields = new_task.fields.validated()?;
        let mut dependencies = Vec::with_capacity(new_task.dependencies.len());
        for dependency in new_task.dependencies {
            if self.task(dependency).is_none() {
                return Err(TaskDomainError::UnknownDependency {
                    task: fields.name,
                    dependency,
                });
            }
            push_unique(&mut dependencies, dependency);
        }

        let task = Task::new(TaskId::new(self.next_id), fields, dependencies, clock);
        let mut candidate = self.tasks.clone();
        candidate.push(task);
        ensure_acyclic(&candidate)?;

        self.next_id += 1;
        self.tasks = candidate;
        self.refresh_plan_status();
        self.tasks
            .last()
            .ok_or(TaskDomainError::TaskNotFound(TaskId::new(self.next_id - 1)))
    }

    /// Returns the first pending task whose dependencies have all completed.
    #[must_use]
    pub fn next_runnable(&self) -> Option<&Task> {
        let statuses = self.statuses();
        self.tasks.iter().find(|task| {
            task.status() == TaskStatus::Pending
                && task
                    .dependencies()
                    .iter()
                    .all(|dep| statuses.get(dep) == Some(&TaskStatus::Completed))
        })
    }

    /// Reports whether a task can start, one is running, everything is
    /// done, or the remaining tasks are stuck.
    #[must_use]
    pub fn poll(&self) -> SchedulerPoll {
        if let Some(running) = self
            .tasks
            .iter()
            .find(|task| task.status() == TaskStatus::Running)
        {
            return SchedulerPoll::Busy { task: running.id() };
        }
        if let Some(ready) = self.next_runnable() {
            return SchedulerPoll::Ready { task: ready.id() };
        }
        if self.is_complete() {
            return SchedulerPoll::Complete;
        }
        SchedulerPoll::Stalled(DependencyUnresolved {
            blocked: self.waiting_tasks(),
        })
    }

    /// Moves task `id` to `target`, recording the payload.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskNotFound`] for an unknown id and
    /// [`TaskDomainError::InvalidTransition`] for a move the state machine
    /// forbids.
    pub fn transition(
        &mut self,
        id: TaskId,
        target: TaskStatus,
        payload: TransitionPayload,
        clock: &impl Clock,
    ) -> Result<&Task, TaskDomainError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id() == id)
            .ok_or(TaskDomainError::TaskNotFound(id))?;
        self.tasks
            .get_mut(index)
            .ok_or(TaskDomainError::TaskNotFound(id))?
            .transition_to(target, payload, clock)?;
        self.refresh_plan_status();
        self.tasks.get(index).ok_or(TaskDomainError::TaskNotFound(id))
    }

    /// Returns aggregate counts over every task.
    #[must_use]
    pub fn progress(&self) -> Progress {
        let mut progress = Progress {
            total: self.tasks.len(),
            ..Progress::default()
        };
        for task in &self.tasks {
            match task.status() {
                TaskStatus::Pending => progress.pending += 1,
                TaskStatus::Running => progress.running += 1,
                TaskStatus::Completed => progress.completed += 1,
                TaskStatus::Failed => progress.failed += 1,
                TaskStatus::Skipped => progress.skipped += 1,
            }
        }
        progress.percent_complete = rounded_percent(progress.completed, progress.total);
        progress
    }

    /// Returns `true` when every task is terminal.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tasks.iter().all(|task| task.status().is_terminal())
    }

    /// Returns pending tasks held back by a failed or skipped dependency.
    #[must_use]
    pub fn blocked_tasks(&self) -> Vec<BlockedTask> {
        let statuses = self.statuses();
        self.tasks
            .iter()
            .filter(|task| task.status() == TaskStatus::Pending)
            .filter_map(|task| {
                let waiting_on: Vec<TaskId> = task
                    .dependencies()
                    .iter()
                    .copied()
                    .filter(|dep| {
                        matches!(
                            statuses.get(dep),
                            Some(TaskStatus::Failed | TaskStatus::Skipped)
                        )
                    })
                    .collect();
                (!waiting_on.is_empty()).then_some(BlockedTask {
                    task: task.id(),
                    waiting_on,
                })
            })
            .collect()
    }

    /// Skips every pending task that can no longer run because a dependency
    /// failed or was skipped, following the chain to later dependents.
    ///
    /// Returns the skipped task ids in the order they were skipped.
    pub fn skip_blocked(&mut self, clock: &impl Clock) -> Vec<TaskId> {
        let mut skipped = Vec::new();
        loop {
            let blocked = self.blocked_tasks();
            if blocked.is_empty() {
                break;
            }
            for entry in blocked {
                let reason = format!(
                    "skipped: dependency {} did not complete",
                    entry
                        .waiting_on
                        .first()
                        .map(ToString::to_string)
                        .unwrap_or_default()
                );
                if let Some(task) = self.tasks.iter_mut().find(|task| task.id() == entry.task)
                    && task
                        .transition_to(TaskStatus::Skipped, TransitionPayload::error(reason), clock)
                        .is_ok()
                {
                    skipped.push(entry.task);
                }
            }
        }
        self.refresh_plan_status();
        skipped
    }

    /// Clears the plan and every task and restarts identifiers.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn statuses(&self) -> HashMap<TaskId, TaskStatus> {
        self.tasks
            .iter()
            .map(|task| (task.id(), task.status()))
            .collect()
    }

    fn waiting_tasks(&self) -> Vec<BlockedTask> {
        let statuses = self.statuses();
        self.tasks
            .iter()
            .filter(|task| task.status() == TaskStatus::Pending)
            .map(|task| BlockedTask {
                task: task.id(),
                waiting_on: task
                    .dependencies()
                    .iter()
                    .copied()
                    .filter(|dep| statuses.get(dep) != Some(&TaskStatus::Completed))
                    .collect(),
            })
            .collect()
    }

    fn refresh_plan_status(&mut self) {
        let status = if !self.is_complete() {
            PlanStatus::Active
        } else if self
            .tasks
            .iter()
            .any(|task| task.status() == TaskStatus::Failed)
        {
            PlanStatus::Failed
        } else {
            PlanStatus::Completed
        };
        if let Some(plan) = self.plan.as_mut() {
            plan.set_status(status);
        }
    }
}

fn push_unique(ids: &mut Vec<TaskId>, id: TaskId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

fn rounded_percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (200 * part + total).checked_div(2 * total).unwrap_or(0);
    u8::try_from(percent).unwrap_or(u8::MAX)
}

/// Rejects dependency edges that form a cycle (Kahn's algorithm).
fn ensure_acyclic(tasks: &[Task]) -> Result<(), TaskDomainError> {
    let mut indegree: HashMap<TaskId, usize> = tasks.iter().map(|task| (task.id(), 0)).collect();
    let mut dependents: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    for task in tasks {
        for dependency in task.dependencies() {
            if !indegree.contains_key(dependency) {
                continue;
            }
            dependents.entry(*dependency).or_default().push(task.id());
            if let Some(count) = indegree.get_mut(&task.id()) {
                *count += 1;
            }
        }
    }

    let mut ready: VecDeque<TaskId> = tasks
        .iter()
        .map(Task::id)
        .filter(|id| indegree.get(id) == Some(&0))
        .collect();
    let mut visited = 0;
    while let Some(id) = ready.pop_front() {
        visited += 1;
        for dependent in dependents.get(&id).into_iter().flatten() {
            if let Some(count) = indegree.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.push_back(*dependent);
                }
            }
        }
    }

    if visited == tasks.len() {
        return Ok(());
    }
    let mut cyclic: Vec<TaskId> = indegree
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(id, _)| id)
        .collect();
    cyclic.sort();
    Err(TaskDomainError::DependencyCycle(cyclic))
}
