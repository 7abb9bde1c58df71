//! Executor step and run outcomes.

use crate::task::domain::{DependencyUnresolved, Progress, TaskId};
use serde::{Deserialize, Serialize};

/// What the executor does when pending tasks can never run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StallPolicy {
    /// Stop and report the blocked tasks.
    #[default]
    Stop,
    /// Skip the blocked tasks and carry on.
    SkipBlocked,
}

/// Result of one executor step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The task ran and completed.
    Completed(TaskId),
    /// The task ran and failed.
    Failed {
        /// Task that failed.
        task: TaskId,
        /// Recorded failure message.
        error: String,
    },
    /// Another task is still running.
    Busy(TaskId),
    /// Every task is terminal.
    Finished,
    /// Pending tasks remain but none can run.
    Stalled(DependencyUnresolved),
}

/// Summary of a run to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Tasks completed during the run, in execution order.
    pub completed: Vec<TaskId>,
    /// Tasks failed during the run, in execution order.
    pub failed: Vec<TaskId>,
    /// Tasks skipped because a dependency failed or was skipped.
    pub skipped: Vec<TaskId>,
    /// Blocked tasks when the run stopped on a stall.
    pub stalled: Option<DependencyUnresolved>,
    /// Progress when the run ended.
    pub progress: Progress,
}
