//! Adapter implementations of the task snapshot port.

mod store;

pub use store::{DEFAULT_SNAPSHOT_KEY, StoreTaskSnapshotRepository};
