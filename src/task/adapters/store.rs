//! Snapshot repository backed by the durable key/value store.

use crate::store::DurableStore;
use crate::task::{
    domain::TaskGraph,
    ports::{TaskSnapshotError, TaskSnapshotRepository, TaskSnapshotResult},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Default store key holding the current graph snapshot.
pub const DEFAULT_SNAPSHOT_KEY: &str = "tasks/current";

/// Stores the task graph as one JSON document under a single key.
#[derive(Debug, Clone)]
pub struct StoreTaskSnapshotRepository<S>
where
    S: DurableStore,
{
    store: Arc<S>,
    key: String,
}

impl<S> StoreTaskSnapshotRepository<S>
where
    S: DurableStore,
{
    /// Creates a repository writing under [`DEFAULT_SNAPSHOT_KEY`].
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::with_key(store, DEFAULT_SNAPSHOT_KEY)
    }

    /// Creates a repository writing under `key`.
    #[must_use]
    pub fn with_key(store: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

#[async_trait]
impl<S> TaskSnapshotRepository for StoreTaskSnapshotRepository<S>
where
    S: DurableStore,
{
    async fn save(&self, graph: &TaskGraph) -> TaskSnapshotResult<()> {
        let bytes = serde_json::to_vec(graph).map_err(TaskSnapshotError::persistence)?;
        self.store
            .put(&self.key, bytes)
            .await
            .map_err(TaskSnapshotError::persistence)
    }

    async fn load(&self) -> TaskSnapshotResult<Option<TaskGraph>> {
        let Some(bytes) = self
            .store
            .get(&self.key)
            .await
            .map_err(TaskSnapshotError::persistence)?
        else {
            return Ok(None);
        };
        let graph: TaskGraph = serde_json::from_slice(&bytes)
            .map_err(|err| TaskSnapshotError::Corrupt(err.to_string()))?;
        if !graph.is_consistent() {
            return Err(TaskSnapshotError::Corrupt(format!(
                "snapshot under '{}' has reused, unknown or cyclic task identifiers",
                self.key
            )));
        }
        Ok(Some(graph))
    }
}
