//! Application services for the symbol cache.

mod cache;

pub use cache::{
    CacheLookup, DEFAULT_KEY_PREFIX, RegisterOutcome, SymbolCache, SymbolCacheError,
    SymbolCacheResult,
};
