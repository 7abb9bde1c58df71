//! Service owning the task graph and its persisted snapshot.

use crate::task::{
    domain::{
        BlockedTask, Plan, PlannedTask, Progress, SchedulerPoll, Task, TaskDomainError, TaskGraph,
        TaskId, TaskSpec, TaskStatus, TransitionPayload,
    },
    ports::{TaskSnapshotError, TaskSnapshotRepository},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Service-level errors for plan operations.
#[derive(Debug, Error)]
pub enum TaskPlanError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Snapshot persistence failed.
    #[error(transparent)]
    Snapshot(#[from] TaskSnapshotError),
}

/// Result type for plan service operations.
pub type TaskPlanResult<T> = Result<T, TaskPlanError>;

/// Plan orchestration service.
///
/// Every mutation is applied to a copy of the graph, written through to the
/// snapshot repository and only then made current, so a failed write leaves
/// the graph as it was.
pub struct TaskPlanService<R, C>
where
    R: TaskSnapshotRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    graph: Arc<Mutex<TaskGraph>>,
}

impl<R, C> Clone for TaskPlanService<R, C>
where
    R: TaskSnapshotRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            graph: Arc::clone(&self.graph),
        }
    }
}

impl<R, C> TaskPlanService<R, C>
where
    R: TaskSnapshotRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service over an empty graph.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_graph(repository, clock, TaskGraph::new())
    }

    /// Creates a service over the persisted snapshot, or an empty graph when
    /// none was saved.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPlanError::Snapshot`] when the snapshot cannot be read.
    pub async fn restore(repository: Arc<R>, clock: Arc<C>) -> TaskPlanResult<Self> {
        let graph = repository.load().await?.unwrap_or_default();
        if !graph.tasks().is_empty() {
            info!(tasks = graph.tasks().len(), "restored task graph snapshot");
        }
        Ok(Self::with_graph(repository, clock, graph))
    }

    fn with_graph(repository: Arc<R>, clock: Arc<C>, graph: TaskGraph) -> Self {
        Self {
            repository,
            clock,
            graph: Arc::new(Mutex::new(graph)),
        }
    }

    /// Replaces the current plan and task list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPlanError`] when validation or persistence fails.
    pub async fn create_plan(
        &self,
        description: impl Into<String> + Send,
        tasks: Vec<PlannedTask>,
    ) -> TaskPlanResult<Plan> {
        let plan = self
            .commit(|graph, clock| graph.create_plan(description, tasks, clock).cloned())
            .await?;
        info!(plan = %plan.id(), description = plan.description(), "created plan");
        Ok(plan)
    }

    /// Appends a task to the current list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPlanError`] when validation or persistence fails.
    pub async fn add_task(&self, new_task: TaskSpec) -> TaskPlanResult<Task> {
        let task = self
            .commit(|graph, clock| graph.add_task(new_task, clock).cloned())
            .await?;
        info!(task = %task.id(), name = task.name(), "added task");
        Ok(task)
    }

    /// Moves task `id` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPlanError::Domain`] for unknown tasks and illegal
    /// transitions, or [`TaskPlanError::Snapshot`] when persistence fails.
    pub async fn transition(
        &self,
        id: TaskId,
        target: TaskStatus,
        payload: TransitionPayload,
    ) -> TaskPlanResult<Task> {
        let task = self
            .commit(|graph, clock| graph.transition(id, target, payload, clock).cloned())
            .await?;
        info!(task = %id, status = %target, "task transitioned");
        Ok(task)
    }

    /// Skips pending tasks that are held back by failed or skipped
    /// dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPlanError::Snapshot`] when persistence fails.
    pub async fn skip_blocked(&self) -> TaskPlanResult<Vec<TaskId>> {
        let skipped = self
            .commit(|graph, clock| Ok(graph.skip_blocked(clock)))
            .await?;
        if !skipped.is_empty() {
            info!(count = skipped.len(), "skipped blocked tasks");
        }
        Ok(skipped)
    }

    /// Clears the plan and every task and restarts identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPlanError::Snapshot`] when persistence fails.
    pub async fn reset(&self) -> TaskPlanResult<()> {
        self.commit(|graph, _| {
            graph.reset();
            Ok(())
        })
        .await?;
        info!("reset task graph");
        Ok(())
    }

    /// Returns the first runnable task.
    pub async fn next_runnable(&self) -> Option<Task> {
        self.graph.lock().await.next_runnable().cloned()
    }

    /// Polls the scheduler, logging stalls.
    pub async fn poll(&self) -> SchedulerPoll {
        let poll = self.graph.lock().await.poll();
        if let SchedulerPoll::Stalled(ref unresolved) = poll {
            warn!(blocked = unresolved.blocked.len(), "task graph stalled");
        }
        poll
    }

    /// Returns aggregate progress.
    pub async fn progress(&self) -> Progress {
        self.graph.lock().await.progress()
    }

    /// Returns `true` when every task is terminal.
    pub async fn is_complete(&self) -> bool {
        self.graph.lock().await.is_complete()
    }

    /// Returns pending tasks held back by failed or skipped dependencies.
    pub async fn blocked_tasks(&self) -> Vec<BlockedTask> {
        self.graph.lock().await.blocked_tasks()
    }

    /// Returns the task with `id`.
    pub async fn task(&self, id: TaskId) -> Option<Task> {
        self.graph.lock().await.task(id).cloned()
    }

    /// Returns a copy of the whole graph.
    pub async fn snapshot(&self) -> TaskGraph {
        self.graph.lock().await.clone()
    }

    async fn commit<T, F>(&self, mutation: F) -> TaskPlanResult<T>
    where
        T: Send,
        F: FnOnce(&mut TaskGraph, &C) -> Result<T, TaskDomainError> + Send,
    {
        let mut current = self.graph.lock().await;
        let mut draft = current.clone();
        let value = mutation(&mut draft, &*self.clock)?;
        self.repository.save(&draft).await?;
        *current = draft;
        Ok(value)
    }
}
