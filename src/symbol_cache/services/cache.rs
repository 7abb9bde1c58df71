//! Content-addressed symbol cache service.

use crate::store::{DurableStore, DurableStoreError};
use crate::symbol_cache::domain::{
    CacheEntry, CacheStats, FileKey, Fingerprint, LiveFingerprint, SearchOptions, SymbolNode,
    SymbolSearch,
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, RwLock as AsyncRwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default key prefix for persisted cache entries.
pub const DEFAULT_KEY_PREFIX: &str = "symbols/";

/// Service-level errors for cache operations.
#[derive(Debug, Error)]
pub enum SymbolCacheError {
    /// Durable store operation failed.
    #[error(transparent)]
    Store(#[from] DurableStoreError),
    /// An entry could not be encoded for persistence.
    #[error("failed to encode cache entry for {key}: {cause}")]
    Encode {
        /// Entry being encoded.
        key: FileKey,
        /// Serialisation failure.
        cause: serde_json::Error,
    },
    /// In-memory state lock was poisoned by a panicking writer.
    #[error("symbol cache state lock poisoned")]
    StatePoisoned,
}

/// Result type for cache operations.
pub type SymbolCacheResult<T> = Result<T, SymbolCacheError>;

/// Outcome of a lookup against a live fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A stored entry matches the live fingerprint.
    Hit(Arc<CacheEntry>),
    /// Nothing usable is cached; the symbols must be fetched. Covers both
    /// never-indexed and stale files.
    Miss,
    /// The live fingerprint could not be computed. Treated as a miss whose
    /// result must not be cached.
    FingerprintUnavailable {
        /// Why the source could not be fingerprinted.
        reason: String,
    },
}

/// Outcome of registering against a live fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The entry was stored and written through.
    Stored(Arc<CacheEntry>),
    /// The fingerprint was unavailable, so nothing was cached.
    Skipped {
        /// Why the source could not be fingerprinted.
        reason: String,
    },
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<FileKey, Arc<CacheEntry>>,
    stats: CacheStats,
    fully_loaded: bool,
}

/// Symbol cache keyed by logical file identity.
///
/// The in-memory map is authoritative and every mutation is written through
/// to the durable store before it becomes visible. Persisted entries from a
/// previous session are loaded lazily: per key on lookup, or all at once by
/// [`SymbolCache::spawn_warmup`] or the first search/stats call.
///
/// Registrations, invalidations and reloads of the same key are serialised;
/// different keys proceed concurrently. [`SymbolCache::clear`] excludes every
/// other mutation while it runs.
pub struct SymbolCache<S, C>
where
    S: DurableStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    key_prefix: Arc<str>,
    state: Arc<RwLock<CacheState>>,
    key_locks: Arc<Mutex<HashMap<FileKey, Arc<AsyncMutex<()>>>>>,
    clear_gate: Arc<AsyncRwLock<()>>,
}

impl<S, C> Clone for SymbolCache<S, C>
where
    S: DurableStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            key_prefix: Arc::clone(&self.key_prefix),
            state: Arc::clone(&self.state),
            key_locks: Arc::clone(&self.key_locks),
            clear_gate: Arc::clone(&self.clear_gate),
        }
    }
}

impl<S, C> SymbolCache<S, C>
where
    S: DurableStore,
    C: Clock + Send + Sync,
{
    /// Creates a cache persisting under [`DEFAULT_KEY_PREFIX`].
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self::with_key_prefix(store, clock, DEFAULT_KEY_PREFIX)
    }

    /// Creates a cache persisting under `key_prefix`.
    #[must_use]
    pub fn with_key_prefix(store: Arc<S>, clock: Arc<C>, key_prefix: &str) -> Self {
        Self {
            store,
            clock,
            key_prefix: Arc::from(key_prefix),
            state: Arc::new(RwLock::new(CacheState::default())),
            key_locks: Arc::new(Mutex::new(HashMap::new())),
            clear_gate: Arc::new(AsyncRwLock::new(())),
        }
    }

    /// Returns the cached entry for `key` when it was produced from content
    /// with `fingerprint`.
    ///
    /// A missing entry and a stale entry both yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheError`] when a lazy reload from the store fails.
    pub async fn lookup(
        &self,
        key: &FileKey,
        fingerprint: &Fingerprint,
    ) -> SymbolCacheResult<Option<Arc<CacheEntry>>> {
        let entry = match self.cached(key)? {
            Some(entry) => Some(entry),
            None => self.reload_one(key).await?,
        };
        Ok(entry.filter(|cached| cached.matches(fingerprint)))
    }

    /// Looks up `key` against a live fingerprint outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheError`] when a lazy reload from the store fails.
    pub async fn lookup_live(
        &self,
        key: &FileKey,
        live: &LiveFingerprint,
    ) -> SymbolCacheResult<CacheLookup> {
        let fingerprint = match live {
            LiveFingerprint::Available(fingerprint) => fingerprint,
            LiveFingerprint::Unavailable { reason } => {
                return Ok(CacheLookup::FingerprintUnavailable {
                    reason: reason.clone(),
                });
            }
        };

        Ok(match self.lookup(key, fingerprint).await? {
            Some(entry) => CacheLookup::Hit(entry),
            None => CacheLookup::Miss,
        })
    }

    /// Stores `payload` for `key`, replacing any previous entry.
    ///
    /// The entry is persisted first and only then swapped into memory, so a
    /// store failure leaves the previous entry (or its absence) untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheError`] when encoding or persistence fails.
    pub async fn register(
        &self,
        key: FileKey,
        fingerprint: Fingerprint,
        payload: Vec<SymbolNode>,
    ) -> SymbolCacheResult<Arc<CacheEntry>> {
        let _gate = self.clear_gate.read().await;
        let key_lock = self.key_lock(&key)?;
        let _guard = key_lock.lock().await;

        let entry = Arc::new(CacheEntry::new(
            key.clone(),
            fingerprint,
            payload,
            &*self.clock,
        ));
        let bytes = serde_json::to_vec(&*entry).map_err(|cause| SymbolCacheError::Encode {
            key: key.clone(),
            cause,
        })?;
        self.store.put(&self.store_key(&key), bytes).await?;

        let mut state = self.write_state()?;
        if let Some(previous) = state.entries.insert(key, Arc::clone(&entry)) {
            state.stats.remove(&previous);
        }
        state.stats.add(&entry);
        drop(state);

        debug!(
            file = %entry.key(),
            fingerprint = %entry.fingerprint(),
            nodes = entry.node_count(),
            "registered symbols"
        );
        Ok(entry)
    }

    /// Registers `payload` unless the live fingerprint is unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheError`] when encoding or persistence fails.
    pub async fn register_live(
        &self,
        key: FileKey,
        live: LiveFingerprint,
        payload: Vec<SymbolNode>,
    ) -> SymbolCacheResult<RegisterOutcome> {
        match live {
            LiveFingerprint::Available(fingerprint) => Ok(RegisterOutcome::Stored(
                self.register(key, fingerprint, payload).await?,
            )),
            LiveFingerprint::Unavailable { reason } => {
                debug!(file = %key, %reason, "fingerprint unavailable, not caching");
                Ok(RegisterOutcome::Skipped { reason })
            }
        }
    }

    /// Removes the entry for `key` from memory and the store.
    ///
    /// Invalidating an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheError::Store`] when the persisted entry cannot be
    /// deleted; the in-memory entry is then kept.
    pub async fn invalidate(&self, key: &FileKey) -> SymbolCacheResult<()> {
        let _gate = self.clear_gate.read().await;
        let key_lock = self.key_lock(key)?;
        let _guard = key_lock.lock().await;

        self.store.delete(&self.store_key(key)).await?;

        let mut state = self.write_state()?;
        if let Some(previous) = state.entries.remove(key) {
            state.stats.remove(&previous);
            debug!(file = %key, "invalidated symbols");
        }
        Ok(())
    }

    /// Removes every entry from memory and the store and resets counters.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheError::Store`] when persisted entries cannot be
    /// listed or deleted; in-memory state is then left as it was.
    pub async fn clear(&self) -> SymbolCacheResult<()> {
        let _gate = self.clear_gate.write().await;

        for stored_key in self.store.list(&self.key_prefix).await? {
            self.store.delete(&stored_key).await?;
        }

        let mut state = self.write_state()?;
        let removed = state.entries.len();
        state.entries.clear();
        state.stats = CacheStats::default();
        state.fully_loaded = true;
        drop(state);

        self.key_locks
            .lock()
            .map_err(|_| SymbolCacheError::StatePoisoned)?
            .clear();
        info!(removed, "cleared symbol cache");
        Ok(())
    }

    /// Starts a lazy search over every cached entry.
    ///
    /// Persisted entries not yet in memory are loaded first. The returned
    /// search holds a snapshot, ordered by file key.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheError`] when loading persisted entries fails.
    pub async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> SymbolCacheResult<SymbolSearch> {
        self.load_persisted().await?;
        let mut entries: Vec<Arc<CacheEntry>> =
            self.read_state()?.entries.values().cloned().collect();
        entries.sort_by(|left, right| left.key().cmp(right.key()));
        Ok(SymbolSearch::new(entries, query, options))
    }

    /// Returns aggregate counters over every cached entry.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheError`] when loading persisted entries fails.
    pub async fn stats(&self) -> SymbolCacheResult<CacheStats> {
        self.load_persisted().await?;
        Ok(self.read_state()?.stats.clone())
    }

    /// Loads every persisted entry not already in memory.
    ///
    /// Entries registered, invalidated or cleared meanwhile win over the
    /// persisted copy. Returns the number of entries loaded.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheError`] when listing or reading the store fails.
    pub async fn load_persisted(&self) -> SymbolCacheResult<usize> {
        if self.read_state()?.fully_loaded {
            return Ok(0);
        }

        let mut loaded = 0;
        for stored_key in self.store.list(&self.key_prefix).await? {
            let Some(key) = self.file_key_of(&stored_key) else {
                warn!(key = %stored_key, "ignoring persisted entry with invalid key");
                continue;
            };
            if self.reload_one(&key).await?.is_some() {
                loaded += 1;
            }
        }

        self.write_state()?.fully_loaded = true;
        if loaded > 0 {
            info!(loaded, "reloaded persisted symbol entries");
        }
        Ok(loaded)
    }

    fn cached(&self, key: &FileKey) -> SymbolCacheResult<Option<Arc<CacheEntry>>> {
        Ok(self.read_state()?.entries.get(key).cloned())
    }

    /// Loads one persisted entry into memory unless memory already has one.
    async fn reload_one(&self, key: &FileKey) -> SymbolCacheResult<Option<Arc<CacheEntry>>> {
        if self.read_state()?.fully_loaded {
            return Ok(None);
        }

        let _gate = self.clear_gate.read().await;
        let key_lock = self.key_lock(key)?;
        let _guard = key_lock.lock().await;

        if let Some(entry) = self.cached(key)? {
            return Ok(Some(entry));
        }

        let store_key = self.store_key(key);
        let Some(bytes) = self.store.get(&store_key).await? else {
            return Ok(None);
        };

        let entry = match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) if entry.key() == key && entry.is_consistent() => Arc::new(entry),
            Ok(_) => {
                warn!(file = %key, "discarding inconsistent persisted entry");
                self.store.delete(&store_key).await?;
                return Ok(None);
            }
            Err(err) => {
                warn!(file = %key, error = %err, "discarding undecodable persisted entry");
                self.store.delete(&store_key).await?;
                return Ok(None);
            }
        };

        let mut state = self.write_state()?;
        state.stats.add(&entry);
        state.entries.insert(key.clone(), Arc::clone(&entry));
        Ok(Some(entry))
    }

    fn key_lock(&self, key: &FileKey) -> SymbolCacheResult<Arc<AsyncMutex<()>>> {
        let mut locks = self
            .key_locks
            .lock()
            .map_err(|_| SymbolCacheError::StatePoisoned)?;
        // Only the map holds idle locks.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Ok(Arc::clone(locks.entry(key.clone()).or_default()))
    }

    #[cfg(test)]
    pub(crate) fn tracked_key_locks(&self) -> usize {
        self.key_locks.lock().map_or(0, |locks| locks.len())
    }

    fn store_key(&self, key: &FileKey) -> String {
        format!("{}{key}", self.key_prefix)
    }

    fn file_key_of(&self, stored_key: &str) -> Option<FileKey> {
        let raw = stored_key.strip_prefix(&*self.key_prefix)?;
        FileKey::new(raw).ok()
    }

    fn read_state(&self) -> SymbolCacheResult<std::sync::RwLockReadGuard<'_, CacheState>> {
        self.state.read().map_err(|_| SymbolCacheError::StatePoisoned)
    }

    fn write_state(&self) -> SymbolCacheResult<std::sync::RwLockWriteGuard<'_, CacheState>> {
        self.state.write().map_err(|_| SymbolCacheError::StatePoisoned)
    }
}

impl<S, C> SymbolCache<S, C>
where
    S: DurableStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Loads persisted entries on a background task.
    ///
    /// The cache serves requests while the reload runs; lookups for keys not
    /// yet loaded fall back to a per-key reload.
    #[must_use]
    pub fn spawn_warmup(&self) -> JoinHandle<SymbolCacheResult<usize>> {
        let cache = self.clone();
        tokio::spawn(async move { cache.load_persisted().await })
    }
}
