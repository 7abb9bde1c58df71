//! Remote tool endpoint port.

use crate::tool_registry::domain::{EndpointConfig, EndpointName, OperationDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for endpoint operations.
pub type EndpointResult<T> = Result<T, EndpointError>;

/// Transport-level contract for talking to a remote tool endpoint.
#[async_trait]
pub trait ToolEndpoint: Send + Sync {
    /// Opens a connection to the endpoint.
    async fn connect(&self, config: &EndpointConfig) -> EndpointResult<EndpointHandle>;

    /// Lists the operations the endpoint exposes.
    async fn list_operations(
        &self,
        handle: &EndpointHandle,
    ) -> EndpointResult<Vec<OperationDefinition>>;

    /// Invokes `operation` with `args`.
    ///
    /// `timeout` is advisory for the transport; the invoker enforces it
    /// independently.
    async fn invoke(
        &self,
        handle: &EndpointHandle,
        operation: &str,
        args: Value,
        timeout: Duration,
    ) -> EndpointResult<Value>;

    /// Closes the connection. Closing an already dropped connection is not
    /// an error.
    async fn close(&self, handle: &EndpointHandle) -> EndpointResult<()>;
}

/// Opaque reference to one established connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointHandle {
    endpoint: EndpointName,
    session: u64,
}

impl EndpointHandle {
    /// Creates a handle for `session` on `endpoint`.
    #[must_use]
    pub const fn new(endpoint: EndpointName, session: u64) -> Self {
        Self { endpoint, session }
    }

    /// Returns the endpoint the handle belongs to.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointName {
        &self.endpoint
    }

    /// Returns the transport-assigned session number.
    #[must_use]
    pub const fn session(&self) -> u64 {
        self.session
    }
}

impl fmt::Display for EndpointHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}#{}", self.endpoint, self.session)
    }
}

/// Whether a failure is worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Network-class failure; back off and retry.
    Retryable,
    /// The endpoint rejected the call; retrying cannot help.
    Fatal,
}

/// Errors reported by endpoint adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// The peer reset the connection mid-call.
    #[error("connection reset: {0}")]
    ConnectionReset(String),

    /// The endpoint is no longer connected.
    #[error("endpoint disconnected: {0}")]
    Disconnected(String),

    /// The call did not finish in time.
    #[error("operation '{operation}' timed out after {elapsed:?}")]
    Timeout {
        /// Operation that timed out.
        operation: String,
        /// Timeout that elapsed.
        elapsed: Duration,
    },

    /// A connection could not be established.
    #[error("failed to connect: {0}")]
    Connect(String),

    /// The endpoint rejected the arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The endpoint reported a logic error.
    #[error("remote error: {0}")]
    Remote(String),
}

impl EndpointError {
    /// Classifies the failure.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::ConnectionReset(_)
            | Self::Disconnected(_)
            | Self::Timeout { .. }
            | Self::Connect(_) => ErrorClass::Retryable,
            Self::InvalidArguments(_) | Self::Remote(_) => ErrorClass::Fatal,
        }
    }

    /// Returns `true` for network-class failures.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.class(), ErrorClass::Retryable)
    }

    /// Returns `true` when the connection that produced the error can no
    /// longer be used.
    #[must_use]
    pub const fn drops_connection(&self) -> bool {
        matches!(self, Self::ConnectionReset(_) | Self::Disconnected(_))
    }
}
