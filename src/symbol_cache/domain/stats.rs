//! Aggregate cache counters.

use super::{CacheEntry, SymbolKind, tally_kinds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters describing the cached entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    file_count: usize,
    total_symbol_count: usize,
    per_kind: BTreeMap<SymbolKind, usize>,
}

impl CacheStats {
    /// Returns the number of cached files.
    #[must_use]
    pub const fn file_count(&self) -> usize {
        self.file_count
    }

    /// Returns the number of symbols across all cached files.
    #[must_use]
    pub const fn total_symbol_count(&self) -> usize {
        self.total_symbol_count
    }

    /// Returns the number of symbols per kind.
    #[must_use]
    pub const fn per_kind(&self) -> &BTreeMap<SymbolKind, usize> {
        &self.per_kind
    }

    /// Returns the count for one kind, zero when absent.
    #[must_use]
    pub fn count_of(&self, kind: SymbolKind) -> usize {
        self.per_kind.get(&kind).copied().unwrap_or_default()
    }

    pub(crate) fn add(&mut self, entry: &CacheEntry) {
        self.file_count += 1;
        self.total_symbol_count += entry.node_count();
        tally_kinds(entry.payload(), &mut self.per_kind);
    }

    pub(crate) fn remove(&mut self, entry: &CacheEntry) {
        self.file_count = self.file_count.saturating_sub(1);
        self.total_symbol_count = self.total_symbol_count.saturating_sub(entry.node_count());

        let mut removed = BTreeMap::new();
        tally_kinds(entry.payload(), &mut removed);
        for (kind, count) in removed {
            if let Some(current) = self.per_kind.get_mut(&kind) {
                *current = current.saturating_sub(count);
                if *current == 0 {
                    self.per_kind.remove(&kind);
                }
            }
        }
    }
}
