//! In-memory integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `indexing_flow_tests`: Fetch-then-register indexing through the invoker
//! - `restart_tests`: Reloading the cache and task graph from the store
//! - `session_tests`: A plan executed end to end through the command surface

mod in_memory {
    pub mod helpers;

    mod indexing_flow_tests;
    mod restart_tests;
    mod session_tests;
}
