//! Remote tool endpoints and the resilient invoker that calls them.
//!
//! Each configured endpoint gets an [`services::EndpointConnection`] with its
//! own lock and generation counter. The [`services::ResilientInvoker`] wraps
//! every call in a timeout, retries network-class failures with exponential
//! backoff, and reconnects dropped connections before retrying.
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
