//! Unit tests for the symbol cache.
