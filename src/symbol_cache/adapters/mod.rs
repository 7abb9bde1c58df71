//! Adapter implementations for symbol cache ports.

mod memory;
mod workspace;

pub use memory::InMemorySourceReader;
pub use workspace::WorkspaceSourceReader;
