//! In-memory durable store adapter.

use crate::store::ports::{DurableStore, DurableStoreError, DurableStoreResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory key/value store.
///
/// Clones share the same underlying map, so a test can hand one clone to the
/// component under test and inspect persisted state through another. Write
/// failures can be injected to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDurableStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    values: BTreeMap<String, Vec<u8>>,
    write_failure: Option<String>,
    writes: usize,
}

fn poisoned(err: impl ToString) -> DurableStoreError {
    DurableStoreError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryDurableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `put` and `delete` fail with `message`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn fail_writes(&self, message: impl Into<String>) -> DurableStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.write_failure = Some(message.into());
        Ok(())
    }

    /// Clears an injected write failure.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn restore_writes(&self) -> DurableStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.write_failure = None;
        Ok(())
    }

    /// Returns the number of successful `put` calls.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn write_count(&self) -> DurableStoreResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.writes)
    }

    /// Returns the number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn len(&self) -> DurableStoreResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.values.len())
    }

    /// Returns whether the store holds no keys.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn is_empty(&self) -> DurableStoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn injected_failure(state: &InMemoryStoreState) -> DurableStoreResult<()> {
    match &state.write_failure {
        Some(message) => Err(DurableStoreError::persistence(std::io::Error::other(
            message.clone(),
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl DurableStore for InMemoryDurableStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> DurableStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        injected_failure(&state)?;
        state.values.insert(key.to_owned(), bytes);
        state.writes += 1;
        Ok(())
    }

    async fn get(&self, key: &str) -> DurableStoreResult<Option<Vec<u8>>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.values.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> DurableStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        injected_failure(&state)?;
        state.values.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> DurableStoreResult<Vec<String>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .values
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
