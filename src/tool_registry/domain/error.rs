//! Error types for endpoint domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing tool registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolRegistryDomainError {
    /// The endpoint name is empty after trimming.
    #[error("endpoint name must not be empty")]
    EmptyEndpointName,

    /// The endpoint name contains characters outside `[a-z0-9_-]`.
    #[error(
        "endpoint name '{0}' contains invalid characters (only lowercase alphanumeric, '-' and '_' allowed)"
    )]
    InvalidEndpointName(String),

    /// The endpoint name exceeds the length limit.
    #[error("endpoint name exceeds 100 character limit: {0}")]
    EndpointNameTooLong(String),

    /// The STDIO program is empty after trimming.
    #[error("STDIO program must not be empty")]
    EmptyStdioCommand,

    /// The HTTP+SSE base URL is empty.
    #[error("HTTP+SSE base URL must not be empty")]
    EmptyHttpSseBaseUrl,

    /// The HTTP+SSE base URL does not have an `http://` or `https://` prefix.
    #[error("HTTP+SSE base URL '{0}' must start with 'http://' or 'https://'")]
    InvalidHttpSseBaseUrl(String),

    /// An operation name is empty after trimming.
    #[error("operation name must not be empty")]
    EmptyOperationName,

    /// Retry policies need at least one attempt.
    #[error("max retries must be at least 1")]
    ZeroRetries,
}

/// Error returned while parsing connection status strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown connection status: {0}")]
pub struct ParseConnectionStatusError(pub String);
