//! Workspace directory source reader.

use crate::symbol_cache::{
    domain::FileKey,
    ports::{SourceError, SourceReader},
};
use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;
use std::sync::Arc;

/// Reads files relative to a workspace root.
///
/// The root is opened once as a capability; keys are resolved inside it, so
/// symlinks or absolute paths cannot reach files outside the workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceSourceReader {
    root: Arc<Dir>,
}

impl WorkspaceSourceReader {
    /// Opens the workspace rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the directory cannot be opened.
    pub fn open(root: &Utf8Path) -> io::Result<Self> {
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }
}

#[async_trait]
impl SourceReader for WorkspaceSourceReader {
    async fn read(&self, key: &FileKey) -> Result<Vec<u8>, SourceError> {
        let root = Arc::clone(&self.root);
        let path = key.as_str().to_owned();
        let outcome = tokio::task::spawn_blocking(move || root.read(&path))
            .await
            .map_err(|err| SourceError::unreadable(key.clone(), err))?;

        match outcome {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(key.clone()))
            }
            Err(err) => Err(SourceError::unreadable(key.clone(), err)),
        }
    }
}
