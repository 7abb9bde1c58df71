//! Connection management and resilient invocation services.

mod connection;
mod invoker;
mod registry;

pub use connection::EndpointConnection;
pub use invoker::{
    InvocationAttempt, InvokerError, InvokerResult, RecordedCall, ResilientInvoker, ToolCall,
};
pub use registry::{EndpointRegistry, EndpointRegistryError};
