//! Value types produced and consumed by the agent services.

mod command;
mod execution;
mod indexing;

pub use command::{Command, CommandOutput, TaskListing};
pub use execution::{ExecutionReport, StallPolicy, StepOutcome};
pub use indexing::{
    DEFAULT_PATH_ARGUMENT, DEFAULT_SYMBOL_OPERATION, IndexOutcome, IndexReport, IndexerSettings,
};
