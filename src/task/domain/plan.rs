//! Plan record.

use super::{PlanId, PlanStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// The objective a task list was created for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    id: PlanId,
    description: String,
    created_at: DateTime<Utc>,
    status: PlanStatus,
}

impl Plan {
    pub(crate) fn new(description: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            id: PlanId::new(),
            description: description.into(),
            created_at: clock.utc(),
            status: PlanStatus::Active,
        }
    }

    /// Returns the plan identifier.
    #[must_use]
    pub const fn id(&self) -> PlanId {
        self.id
    }

    /// Returns the plan description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the plan status.
    #[must_use]
    pub const fn status(&self) -> PlanStatus {
        self.status
    }

    pub(crate) const fn set_status(&mut self, status: PlanStatus) {
        self.status = status;
    }
}
