//! One-task-at-a-time plan executor.

use super::AgentResult;
use crate::agent::{
    domain::{ExecutionReport, StallPolicy, StepOutcome},
    ports::TaskHandler,
};
use crate::task::{
    domain::{SchedulerPoll, TaskStatus, TransitionPayload},
    ports::TaskSnapshotRepository,
    services::TaskPlanService,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Drives the task graph by running the next runnable task through a
/// [`TaskHandler`].
pub struct TaskExecutor<R, C, H>
where
    R: TaskSnapshotRepository,
    C: Clock + Send + Sync,
    H: TaskHandler,
{
    plans: TaskPlanService<R, C>,
    handler: Arc<H>,
    stall_policy: StallPolicy,
}

impl<R, C, H> TaskExecutor<R, C, H>
where
    R: TaskSnapshotRepository,
    C: Clock + Send + Sync,
    H: TaskHandler,
{
    /// Creates an executor that stops on stalls.
    #[must_use]
    pub fn new(plans: TaskPlanService<R, C>, handler: Arc<H>) -> Self {
        Self {
            plans,
            handler,
            stall_policy: StallPolicy::default(),
        }
    }

    /// Sets what happens when pending tasks can never run.
    #[must_use]
    pub const fn with_stall_policy(mut self, stall_policy: StallPolicy) -> Self {
        self.stall_policy = stall_policy;
        self
    }

    /// Returns the plan service the executor drives.
    #[must_use]
    pub const fn plans(&self) -> &TaskPlanService<R, C> {
        &self.plans
    }

    /// Runs the next runnable task, if any.
    ///
    /// The task is marked running before the handler starts. A handler error
    /// fails the task and records the error message on it.
    ///
    /// # Errors
    ///
    /// Returns [`super::AgentError::Plan`] when a transition cannot be
    /// persisted.
    pub async fn run_next(&self) -> AgentResult<StepOutcome> {
        let id = match self.plans.poll().await {
            SchedulerPoll::Ready { task } => task,
            SchedulerPoll::Busy { task } => return Ok(StepOutcome::Busy(task)),
            SchedulerPoll::Complete => return Ok(StepOutcome::Finished),
            SchedulerPoll::Stalled(unresolved) => return Ok(StepOutcome::Stalled(unresolved)),
        };

        let task = self
            .plans
            .transition(id, TaskStatus::Running, TransitionPayload::none())
            .await?;
        info!(task = %id, name = task.name(), "task started");

        match self.handler.execute(&task).await {
            Ok(result) => {
                self.plans
                    .transition(id, TaskStatus::Completed, TransitionPayload::result(result))
                    .await?;
                info!(task = %id, "task completed");
                Ok(StepOutcome::Completed(id))
            }
            Err(err) => {
                let error = err.to_string();
                self.plans
                    .transition(id, TaskStatus::Failed, TransitionPayload::error(error.clone()))
                    .await?;
                warn!(task = %id, %error, "task failed");
                Ok(StepOutcome::Failed { task: id, error })
            }
        }
    }

    /// Runs tasks until every task is terminal, another task is running, or
    /// the plan stalls under [`StallPolicy::Stop`].
    ///
    /// # Errors
    ///
    /// Returns [`super::AgentError::Plan`] when a transition cannot be
    /// persisted.
    pub async fn run_to_completion(&self) -> AgentResult<ExecutionReport> {
        let mut report = ExecutionReport::default();
        loop {
            match self.run_next().await? {
                StepOutcome::Completed(task) => report.completed.push(task),
                StepOutcome::Failed { task, .. } => report.failed.push(task),
                StepOutcome::Busy(_) | StepOutcome::Finished => break,
                StepOutcome::Stalled(unresolved) => match self.stall_policy {
                    StallPolicy::Stop => {
                        report.stalled = Some(unresolved);
                        break;
                    }
                    StallPolicy::SkipBlocked => {
                        let skipped = self.plans.skip_blocked().await?;
                        if skipped.is_empty() {
                            report.stalled = Some(unresolved);
                            break;
                        }
                        report.skipped.extend(skipped);
                    }
                },
            }
        }
        report.progress = self.plans.progress().await;
        Ok(report)
    }
}
