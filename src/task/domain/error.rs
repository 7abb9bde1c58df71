//! Error types for task graph validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned by task graph operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// No task with the identifier exists in the graph.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A dependency names a task that does not exist.
    #[error("task '{task}' depends on unknown task {dependency}")]
    UnknownDependency {
        /// Name of the task being created.
        task: String,
        /// Identifier that could not be resolved.
        dependency: TaskId,
    },

    /// A plan task refers to a position outside the plan.
    #[error("plan task '{task}' depends on position {position}, but the plan has {len} tasks")]
    DependencyPositionOutOfRange {
        /// Name of the task being created.
        task: String,
        /// Position that could not be resolved.
        position: usize,
        /// Number of tasks in the plan.
        len: usize,
    },

    /// The dependency edges contain a cycle.
    #[error("dependency cycle among tasks {}", format_ids(.0))]
    DependencyCycle(Vec<TaskId>),

    /// The requested status change is not allowed by the state machine.
    #[error("invalid transition for task {task} from {from} to {to}")]
    InvalidTransition {
        /// Task whose status was to change.
        task: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Attempted status.
        to: TaskStatus,
    },
}

fn format_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing plan statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown plan status: {0}")]
pub struct ParsePlanStatusError(pub String);
