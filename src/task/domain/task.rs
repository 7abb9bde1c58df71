//! Task records and the inputs used to create and transition them.

use super::{TaskDomainError, TaskId, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A unit of work in the task graph.
///
/// Only the status and the fields it stamps change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: String,
    description: Option<String>,
    status: TaskStatus,
    dependencies: Vec<TaskId>,
    priority: TaskPriority,
    result: Option<Value>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub(crate) fn new(
        id: TaskId,
        fields: TaskFields,
        dependencies: Vec<TaskId>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            status: TaskStatus::Pending,
            dependencies,
            priority: fields.priority,
            result: None,
            error: None,
            created_at: clock.utc(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns dependency identifiers in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    /// Returns the task priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the recorded result, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Returns the recorded error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the task started running.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when the task reached a terminal status.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Moves the task to `target`.
    ///
    /// Stamps `started_at` when entering [`TaskStatus::Running`] and
    /// `completed_at` when entering a terminal status. Result and error are
    /// only overwritten when the payload carries them.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the state machine
    /// forbids the move; the task is left unchanged.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        payload: TransitionPayload,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidTransition {
                task: self.id,
                from: self.status,
                to: target,
            });
        }

        let now = clock.utc();
        if target == TaskStatus::Running {
            self.started_at = Some(now);
        }
        if target.is_terminal() {
            self.completed_at = Some(now);
        }
        if payload.result.is_some() {
            self.result = payload.result;
        }
        if payload.error.is_some() {
            self.error = payload.error;
        }
        self.status = target;
        Ok(())
    }
}

/// Fields shared by ad-hoc and plan task requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TaskFields {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) priority: TaskPriority,
}

impl TaskFields {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            priority: TaskPriority::default(),
        }
    }

    pub(crate) fn validated(&self) -> Result<Self, TaskDomainError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TaskDomainError::EmptyTaskName);
        }
        Ok(Self {
            name: name.to_owned(),
            description: self.description.clone(),
            priority: self.priority,
        })
    }
}

/// Request to append one task to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub(crate) fields: TaskFields,
    pub(crate) dependencies: Vec<TaskId>,
}

impl TaskSpec {
    /// Creates a request for a task named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            fields: TaskFields::new(name),
            dependencies: Vec::new(),
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.fields.description = Some(description.into());
        self
    }

    /// Sets the task priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.fields.priority = priority;
        self
    }

    /// Adds dependencies on existing tasks.
    #[must_use]
    pub fn depends_on(mut self, dependencies: impl IntoIterator<Item = TaskId>) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    /// Returns the requested task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.fields.name
    }
}

/// One task of a new plan.
///
/// Dependencies refer to other tasks of the same plan by their position in
/// the task list, since none of them has an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTask {
    pub(crate) fields: TaskFields,
    pub(crate) after: Vec<usize>,
}

impl PlannedTask {
    /// Creates a plan entry for a task named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            fields: TaskFields::new(name),
            after: Vec::new(),
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.fields.description = Some(description.into());
        self
    }

    /// Sets the task priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.fields.priority = priority;
        self
    }

    /// Adds dependencies on the plan tasks at `positions`.
    #[must_use]
    pub fn after(mut self, positions: impl IntoIterator<Item = usize>) -> Self {
        self.after.extend(positions);
        self
    }

    /// Returns the requested task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.fields.name
    }
}

/// Data recorded alongside a status transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionPayload {
    /// Result value to record.
    pub result: Option<Value>,
    /// Error message to record.
    pub error: Option<String>,
}

impl TransitionPayload {
    /// Returns a payload that records nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns a payload recording `result`.
    #[must_use]
    pub fn result(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    /// Returns a payload recording `message` as the task error.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }
}
