//! Agent driver glue over the cache, task graph and invoker.
//!
//! The indexer answers symbol requests from the cache and falls back to a
//! remote endpoint on a miss. The executor runs the task graph one task at a
//! time, and the command service exposes both through a small command set
//! whose outputs are plain serialisable values.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
