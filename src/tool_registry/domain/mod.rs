//! Domain model for remote tool endpoints and call policies.
//!
//! Endpoints are identified by validated names and reached over a STDIO or
//! HTTP+SSE transport. Retry, backoff and timeout behaviour is expressed as
//! plain policy values so the invoker stays free of hard-coded constants.

mod endpoint;
mod error;
mod ids;
mod operation;
mod policy;
mod transport;

pub use endpoint::{ConnectionState, ConnectionStatus, EndpointConfig};
pub use error::{ParseConnectionStatusError, ToolRegistryDomainError};
pub use ids::EndpointName;
pub use operation::OperationDefinition;
pub use policy::{
    CallOptions, DEFAULT_BASE_DELAY, DEFAULT_LONG_TIMEOUT, DEFAULT_MAX_RETRIES,
    DEFAULT_SHORT_TIMEOUT, RetryPolicy, TimeoutPolicy,
};
pub use transport::{EndpointTransport, HttpSseTransportConfig, StdioTransportConfig};
