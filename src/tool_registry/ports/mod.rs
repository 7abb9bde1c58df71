//! Port contracts for remote tool endpoints.

mod endpoint;

pub use endpoint::{EndpointError, EndpointHandle, EndpointResult, ErrorClass, ToolEndpoint};
