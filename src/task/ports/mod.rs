//! Port contracts for task graph persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod snapshot;

pub use snapshot::{TaskSnapshotError, TaskSnapshotRepository, TaskSnapshotResult};
