//! Source reader port used to fingerprint live file content.

use crate::symbol_cache::domain::{FileKey, Fingerprint, LiveFingerprint};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Read access to the current bytes of logical files.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Reads the raw bytes currently stored for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the file is missing or unreadable.
    async fn read(&self, key: &FileKey) -> Result<Vec<u8>, SourceError>;

    /// Computes a fresh fingerprint for `key`.
    ///
    /// Read failures become [`LiveFingerprint::Unavailable`] rather than an
    /// error, so callers treat them as a miss that must not be cached.
    async fn fingerprint(&self, key: &FileKey) -> LiveFingerprint {
        match self.read(key).await {
            Ok(bytes) => LiveFingerprint::Available(Fingerprint::of_bytes(&bytes)),
            Err(err) => LiveFingerprint::unavailable(err.to_string()),
        }
    }
}

/// Errors returned by source reader implementations.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The file does not exist.
    #[error("source file not found: {0}")]
    NotFound(FileKey),

    /// The file exists but could not be read.
    #[error("failed to read source file {key}: {cause}")]
    Unreadable {
        /// File that failed to read.
        key: FileKey,
        /// Underlying I/O failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl SourceError {
    /// Wraps an I/O failure for `key`.
    pub fn unreadable(key: FileKey, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unreadable {
            key,
            cause: Arc::new(err),
        }
    }
}
