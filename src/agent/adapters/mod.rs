//! Adapter implementations of the agent ports.

mod invoker_handler;

pub use invoker_handler::InvokerTaskHandler;
