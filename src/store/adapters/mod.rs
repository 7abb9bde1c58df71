//! Adapter implementations for the durable store port.

mod directory;
mod memory;

pub use directory::DirectoryDurableStore;
pub use memory::InMemoryDurableStore;
