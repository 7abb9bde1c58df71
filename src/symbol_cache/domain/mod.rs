//! Domain model for the content-addressed symbol cache.
//!
//! Entries pair a file's symbol tree with the fingerprint of the content that
//! produced it. The domain owns key normalisation, fingerprinting, counters
//! and search; storage and source access stay behind ports.

mod entry;
mod error;
mod fingerprint;
mod key;
mod search;
mod stats;
mod symbol;

pub use entry::CacheEntry;
pub use error::{ParseSymbolKindError, SymbolCacheDomainError};
pub use fingerprint::{Fingerprint, LiveFingerprint};
pub use key::FileKey;
pub use search::{
    QUALIFIED_PATH_SEPARATOR, SearchOptions, SymbolMatch, SymbolMatches, SymbolSearch,
};
pub use stats::CacheStats;
pub use symbol::{SymbolKind, SymbolNode, count_nodes, tally_kinds};
