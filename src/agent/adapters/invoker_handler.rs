//! Task handler that runs a task as a batch of concurrent tool calls.

use crate::agent::ports::{HandlerError, TaskHandler};
use crate::task::domain::Task;
use crate::tool_registry::{
    ports::ToolEndpoint,
    services::{ResilientInvoker, ToolCall},
};
use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;
use tracing::debug;

/// Runs the tool calls `plan_calls` derives from each task.
///
/// The calls of one task are fanned out together. The task completes with
/// the array of their results in call order, or fails with the first error
/// in call order once every call has settled.
pub struct InvokerTaskHandler<E, C, F>
where
    E: ToolEndpoint,
    C: Clock + Send + Sync,
    F: Fn(&Task) -> Vec<ToolCall> + Send + Sync,
{
    invoker: ResilientInvoker<E, C>,
    plan_calls: F,
}

impl<E, C, F> InvokerTaskHandler<E, C, F>
where
    E: ToolEndpoint,
    C: Clock + Send + Sync,
    F: Fn(&Task) -> Vec<ToolCall> + Send + Sync,
{
    /// Creates a handler deriving calls with `plan_calls`.
    #[must_use]
    pub const fn new(invoker: ResilientInvoker<E, C>, plan_calls: F) -> Self {
        Self {
            invoker,
            plan_calls,
        }
    }
}

#[async_trait]
impl<E, C, F> TaskHandler for InvokerTaskHandler<E, C, F>
where
    E: ToolEndpoint,
    C: Clock + Send + Sync,
    F: Fn(&Task) -> Vec<ToolCall> + Send + Sync,
{
    async fn execute(&self, task: &Task) -> Result<Value, HandlerError> {
        let calls = (self.plan_calls)(task);
        debug!(task = %task.id(), calls = calls.len(), "dispatching tool calls");

        let mut values = Vec::with_capacity(calls.len());
        for outcome in self.invoker.call_all(calls).await {
            values.push(outcome?);
        }
        Ok(Value::Array(values))
    }
}
