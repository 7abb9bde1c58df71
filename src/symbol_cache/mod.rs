//! Content-addressed symbol cache with change detection.
//!
//! Symbol trees fetched from a remote endpoint are cached per file together
//! with the SHA-256 fingerprint of the content that produced them. A lookup
//! only hits when the stored fingerprint equals one computed fresh from the
//! live source, so external edits are never masked by stale data. The module
//! follows hexagonal architecture:
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
