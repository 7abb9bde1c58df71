//! Port contracts for the agent services.

mod handler;

pub use handler::{HandlerError, TaskHandler};
