//! Dependency-gated task scheduling.
//!
//! A plan is an ordered task list with dependency edges. Tasks run one at a
//! time in insertion order once their dependencies have completed; the graph
//! reports when the remaining tasks can never run. The module follows
//! hexagonal architecture:
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
