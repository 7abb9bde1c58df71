//! Errors surfaced by the agent services.

use crate::symbol_cache::{domain::FileKey, domain::SymbolCacheDomainError, services::SymbolCacheError};
use crate::task::services::TaskPlanError;
use crate::tool_registry::services::InvokerError;
use thiserror::Error;

/// Service-level errors for agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A path could not be turned into a file key.
    #[error(transparent)]
    InvalidPath(#[from] SymbolCacheDomainError),
    /// A cache operation failed.
    #[error(transparent)]
    Cache(#[from] SymbolCacheError),
    /// A plan operation failed.
    #[error(transparent)]
    Plan(#[from] TaskPlanError),
    /// A remote call failed.
    #[error(transparent)]
    Invocation(#[from] InvokerError),
    /// The endpoint returned something other than a symbol tree.
    #[error("endpoint returned an undecodable symbol tree for {file}: {cause}")]
    Decode {
        /// File being indexed.
        file: FileKey,
        /// Decoding failure.
        cause: serde_json::Error,
    },
}

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
