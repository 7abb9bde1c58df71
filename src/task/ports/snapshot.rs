//! Snapshot port for persisting the whole task graph.

use crate::task::domain::TaskGraph;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for snapshot repository operations.
pub type TaskSnapshotResult<T> = Result<T, TaskSnapshotError>;

/// Persistence contract for task graph snapshots.
///
/// The graph is small and replaced wholesale on every mutation, so the port
/// deals in complete snapshots rather than individual tasks.
#[async_trait]
pub trait TaskSnapshotRepository: Send + Sync {
    /// Replaces the stored snapshot with `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSnapshotError`] when encoding or persistence fails.
    async fn save(&self, graph: &TaskGraph) -> TaskSnapshotResult<()>;

    /// Loads the stored snapshot.
    ///
    /// Returns `None` when nothing has been saved.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSnapshotError`] when the snapshot cannot be read or
    /// decoded.
    async fn load(&self) -> TaskSnapshotResult<Option<TaskGraph>>;
}

/// Errors returned by snapshot repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskSnapshotError {
    /// The stored snapshot could not be decoded.
    #[error("corrupt task snapshot: {0}")]
    Corrupt(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskSnapshotError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
