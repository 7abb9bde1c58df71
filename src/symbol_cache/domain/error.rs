//! Error types for symbol cache domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing symbol cache domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SymbolCacheDomainError {
    /// The file key is empty after normalisation.
    #[error("file key must not be empty")]
    EmptyFileKey,

    /// The file key contains a `..` segment.
    #[error("file key '{0}' must not contain parent directory segments")]
    ParentSegmentInFileKey(String),

    /// The fingerprint is not a 64-character lowercase hex digest.
    #[error("invalid fingerprint '{0}', expected a SHA-256 hex digest")]
    InvalidFingerprint(String),

    /// A symbol node has an empty name.
    #[error("symbol name must not be empty")]
    EmptySymbolName,
}

/// Error returned while parsing symbol kinds from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown symbol kind: {0}")]
pub struct ParseSymbolKindError(pub String);
