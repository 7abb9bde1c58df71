//! Adapter implementations of the endpoint port.

mod scripted;

pub use scripted::{ScriptEvent, ScriptedEndpoint, ScriptedResponse};
