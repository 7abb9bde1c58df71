//! Port contracts for the symbol cache.
//!
//! Persistence goes through [`crate::store::DurableStore`]; this module only
//! adds live source access for fingerprinting.

mod source;

pub use source::{SourceError, SourceReader};
