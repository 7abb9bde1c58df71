//! Application services for plan orchestration.

mod plan;

pub use plan::{TaskPlanError, TaskPlanResult, TaskPlanService};
