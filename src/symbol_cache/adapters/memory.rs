//! In-memory source reader for tests and scripted sessions.

use crate::symbol_cache::{
    domain::FileKey,
    ports::{SourceError, SourceReader},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Source reader serving file contents from memory.
///
/// Files can be edited, removed or marked unreadable while the cache is in
/// use, which models external edits between lookups.
#[derive(Debug, Clone, Default)]
pub struct InMemorySourceReader {
    state: Arc<RwLock<InMemorySourceState>>,
}

#[derive(Debug, Default)]
struct InMemorySourceState {
    files: HashMap<FileKey, Vec<u8>>,
    unreadable: HashSet<FileKey>,
}

impl InMemorySourceReader {
    /// Creates a reader with no files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes (or overwrites) the contents of `key`.
    pub fn write(&self, key: &FileKey, contents: impl Into<Vec<u8>>) {
        if let Ok(mut state) = self.state.write() {
            state.files.insert(key.clone(), contents.into());
        }
    }

    /// Deletes `key`.
    pub fn remove(&self, key: &FileKey) {
        if let Ok(mut state) = self.state.write() {
            state.files.remove(key);
        }
    }

    /// Makes reads of `key` fail until [`Self::make_readable`] is called.
    pub fn make_unreadable(&self, key: &FileKey) {
        if let Ok(mut state) = self.state.write() {
            state.unreadable.insert(key.clone());
        }
    }

    /// Clears a previous [`Self::make_unreadable`].
    pub fn make_readable(&self, key: &FileKey) {
        if let Ok(mut state) = self.state.write() {
            state.unreadable.remove(key);
        }
    }
}

#[async_trait]
impl SourceReader for InMemorySourceReader {
    async fn read(&self, key: &FileKey) -> Result<Vec<u8>, SourceError> {
        let state = self.state.read().map_err(|err| {
            SourceError::unreadable(key.clone(), std::io::Error::other(err.to_string()))
        })?;

        if state.unreadable.contains(key) {
            return Err(SourceError::unreadable(
                key.clone(),
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }

        state
            .files
            .get(key)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(key.clone()))
    }
}
