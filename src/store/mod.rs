//! Durable key/value persistence consumed by the cache and task graph.
//!
//! The storage backend is an external collaborator. This module only defines
//! the narrow port the core writes through to and reloads from, plus two
//! adapters:
//!
//! - [`adapters::InMemoryDurableStore`] for tests and ephemeral sessions
//! - [`adapters::DirectoryDurableStore`] storing one file per key inside a
//!   capability-scoped directory

pub mod adapters;
pub mod ports;

pub use ports::{DurableStore, DurableStoreError, DurableStoreResult};
