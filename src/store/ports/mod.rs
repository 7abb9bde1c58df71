//! Port contract for durable key/value persistence.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for durable store operations.
pub type DurableStoreResult<T> = Result<T, DurableStoreError>;

/// Key/value persistence contract.
///
/// Keys are `/`-separated strings; values are opaque bytes. Implementations
/// must make a completed `put` visible to every later `get` and `list`.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Stores `bytes` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`DurableStoreError`] when the value cannot be persisted.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> DurableStoreResult<()>;

    /// Loads the value stored under `key`.
    ///
    /// Returns `None` when the key does not exist.
    async fn get(&self, key: &str) -> DurableStoreResult<Option<Vec<u8>>>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> DurableStoreResult<()>;

    /// Lists every stored key starting with `prefix`, in ascending order.
    async fn list(&self, prefix: &str) -> DurableStoreResult<Vec<String>>;
}

/// Errors returned by durable store implementations.
#[derive(Debug, Clone, Error)]
pub enum DurableStoreError {
    /// The key cannot be represented by the backend.
    #[error("invalid store key: {0}")]
    InvalidKey(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DurableStoreError {
    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
