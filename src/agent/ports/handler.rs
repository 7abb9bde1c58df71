//! Task execution port.

use crate::task::domain::Task;
use crate::tool_registry::services::InvokerError;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors a handler reports for the task it ran.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A remote call made for the task failed.
    #[error(transparent)]
    Invocation(#[from] InvokerError),
    /// The handler rejected or could not finish the task.
    #[error("{0}")]
    Failed(String),
}

/// Carries out the work a task describes.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Executes `task` and returns the value recorded as its result.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the task failed; its message is recorded
    /// on the task.
    async fn execute(&self, task: &Task) -> Result<Value, HandlerError>;
}
