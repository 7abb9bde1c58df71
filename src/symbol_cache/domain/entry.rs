//! Cache entry aggregate.

use super::{FileKey, Fingerprint, SymbolNode, count_nodes};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Symbol payload for one file together with the fingerprint that produced
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    key: FileKey,
    fingerprint: Fingerprint,
    payload: Vec<SymbolNode>,
    indexed_at: DateTime<Utc>,
    node_count: usize,
}

impl CacheEntry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn new(
        key: FileKey,
        fingerprint: Fingerprint,
        payload: Vec<SymbolNode>,
        clock: &impl Clock,
    ) -> Self {
        let node_count = count_nodes(&payload);
        Self {
            key,
            fingerprint,
            payload,
            indexed_at: clock.utc(),
            node_count,
        }
    }

    /// Returns the file key.
    #[must_use]
    pub const fn key(&self) -> &FileKey {
        &self.key
    }

    /// Returns the fingerprint of the source that produced the payload.
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Returns the top-level symbols in document order.
    #[must_use]
    pub fn payload(&self) -> &[SymbolNode] {
        &self.payload
    }

    /// Returns when the payload was indexed.
    #[must_use]
    pub const fn indexed_at(&self) -> DateTime<Utc> {
        self.indexed_at
    }

    /// Returns the total number of nodes in the payload.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns whether the stored node count agrees with the payload.
    ///
    /// Persisted entries failing this check are discarded on reload.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.node_count == count_nodes(&self.payload)
    }

    /// Returns whether the entry was produced from content with
    /// `fingerprint`.
    #[must_use]
    pub fn matches(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprint == *fingerprint
    }
}
