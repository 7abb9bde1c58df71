//! Shared world state for task scheduling BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use armature::{
    store::adapters::InMemoryDurableStore,
    task::{
        adapters::StoreTaskSnapshotRepository,
        domain::{Task, TaskId},
        services::{TaskPlanError, TaskPlanService},
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Snapshot repository used by the BDD world.
pub type TestSnapshots = StoreTaskSnapshotRepository<InMemoryDurableStore>;

/// Plan service used by the BDD world.
pub type TestPlanService = TaskPlanService<TestSnapshots, DefaultClock>;

/// Scenario world for task scheduling behaviour tests.
pub struct SchedulingWorld {
    pub store: Arc<InMemoryDurableStore>,
    pub plans: TestPlanService,
    pub task_ids: HashMap<String, TaskId>,
    pub last_transition: Option<Result<Task, TaskPlanError>>,
}

impl SchedulingWorld {
    /// Creates a world over an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryDurableStore::new());
        let plans = TaskPlanService::new(
            Arc::new(StoreTaskSnapshotRepository::new(Arc::clone(&store))),
            Arc::new(DefaultClock),
        );
        Self {
            store,
            plans,
            task_ids: HashMap::new(),
            last_transition: None,
        }
    }

    /// Returns the id of the task created under `name`.
    pub fn task_id(&self, name: &str) -> Result<TaskId, eyre::Report> {
        self.task_ids
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("no task named '{name}' in scenario world"))
    }

    /// Returns the current state of the task created under `name`.
    pub fn task(&self, name: &str) -> Result<Task, eyre::Report> {
        let id = self.task_id(name)?;
        run_async(self.plans.task(id)).ok_or_else(|| eyre::eyre!("task '{name}' is missing"))
    }
}

impl Default for SchedulingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SchedulingWorld {
    SchedulingWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
