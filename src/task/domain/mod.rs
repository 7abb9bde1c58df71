//! Domain model for the dependency-gated task graph.
//!
//! Tasks move through a small state machine and only run once every task
//! they depend on has completed. The graph is pure data; persistence and
//! locking live in the service layer.

mod error;
mod graph;
mod ids;
mod plan;
mod status;
mod task;

pub use error::{
    ParsePlanStatusError, ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError,
};
pub use graph::{BlockedTask, DependencyUnresolved, Progress, SchedulerPoll, TaskGraph};
pub use ids::{PlanId, TaskId};
pub use plan::Plan;
pub use status::{PlanStatus, TaskPriority, TaskStatus};
pub use task::{PlannedTask, Task, TaskSpec, TransitionPayload};
