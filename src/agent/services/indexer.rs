//! Fetch-then-register symbol indexing.

use super::{AgentError, AgentResult};
use crate::agent::domain::{IndexOutcome, IndexReport, IndexerSettings};
use crate::store::DurableStore;
use crate::symbol_cache::{
    domain::{FileKey, LiveFingerprint, SymbolNode, count_nodes},
    ports::SourceReader,
    services::{CacheLookup, SymbolCache},
};
use crate::tool_registry::{
    domain::CallOptions,
    ports::ToolEndpoint,
    services::ResilientInvoker,
};
use futures::future::join_all;
use mockable::Clock;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Serves symbol trees from the cache and fetches the ones it cannot.
///
/// Fingerprints are always computed from the live source. A fetched tree is
/// only cached when the file still has the fingerprint it had before the
/// fetch, so a tree is never stored against content it was not built from.
pub struct SymbolIndexService<S, R, E, C>
where
    S: DurableStore,
    R: SourceReader,
    E: ToolEndpoint,
    C: Clock + Send + Sync,
{
    cache: SymbolCache<S, C>,
    source: Arc<R>,
    invoker: ResilientInvoker<E, C>,
    settings: Arc<IndexerSettings>,
}

impl<S, R, E, C> Clone for SymbolIndexService<S, R, E, C>
where
    S: DurableStore,
    R: SourceReader,
    E: ToolEndpoint,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            source: Arc::clone(&self.source),
            invoker: self.invoker.clone(),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<S, R, E, C> SymbolIndexService<S, R, E, C>
where
    S: DurableStore,
    R: SourceReader,
    E: ToolEndpoint,
    C: Clock + Send + Sync,
{
    /// Creates an indexer.
    #[must_use]
    pub fn new(
        cache: SymbolCache<S, C>,
        source: Arc<R>,
        invoker: ResilientInvoker<E, C>,
        settings: IndexerSettings,
    ) -> Self {
        Self {
            cache,
            source,
            invoker,
            settings: Arc::new(settings),
        }
    }

    /// Returns the cache the indexer fills.
    #[must_use]
    pub const fn cache(&self) -> &SymbolCache<S, C> {
        &self.cache
    }

    /// Returns the symbol tree for `key`, from the cache when it is current.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the fetch, decoding or caching fails.
    pub async fn symbols(&self, key: &FileKey) -> AgentResult<Vec<SymbolNode>> {
        let live = self.source.fingerprint(key).await;
        if let CacheLookup::Hit(entry) = self.cache.lookup_live(key, &live).await? {
            return Ok(entry.payload().to_vec());
        }
        let payload = self.fetch(key).await?;
        self.store_if_unchanged(key, live, payload.clone()).await?;
        Ok(payload)
    }

    /// Indexes one file.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the fetch, decoding or caching fails.
    pub async fn index_file(&self, key: &FileKey) -> AgentResult<IndexOutcome> {
        let live = self.source.fingerprint(key).await;
        match self.cache.lookup_live(key, &live).await? {
            CacheLookup::Hit(entry) => {
                debug!(file = %key, "symbols served from cache");
                return Ok(IndexOutcome::Cached {
                    file: key.clone(),
                    nodes: entry.node_count(),
                });
            }
            CacheLookup::Miss => debug!(file = %key, "cache miss, fetching symbols"),
            CacheLookup::FingerprintUnavailable { reason } => {
                debug!(file = %key, %reason, "fingerprint unavailable, fetching symbols");
            }
        }

        let payload = self.fetch(key).await?;
        self.store_if_unchanged(key, live, payload).await
    }

    /// Indexes every file concurrently and reports the outcomes in request
    /// order.
    ///
    /// Failures are reported per file and never abort the batch.
    pub async fn index_files(&self, keys: &[FileKey]) -> IndexReport {
        let outcomes = join_all(keys.iter().map(|key| async move {
            self.index_file(key).await.unwrap_or_else(|err| {
                warn!(file = %key, error = %err, "indexing failed");
                IndexOutcome::Failed {
                    file: key.clone(),
                    error: err.to_string(),
                }
            })
        }))
        .await;

        let report = IndexReport { outcomes };
        info!(
            files = keys.len(),
            cached = report.cached(),
            indexed = report.indexed(),
            failed = report.failed(),
            "indexing batch finished"
        );
        report
    }

    async fn fetch(&self, key: &FileKey) -> AgentResult<Vec<SymbolNode>> {
        let mut args = Map::new();
        args.insert(
            self.settings.path_argument().to_owned(),
            Value::String(key.as_str().to_owned()),
        );
        let response = self
            .invoker
            .call(
                self.settings.endpoint(),
                self.settings.operation(),
                Value::Object(args),
                CallOptions::default(),
            )
            .await?;
        decode_symbols(key, response)
    }

    async fn store_if_unchanged(
        &self,
        key: &FileKey,
        before: LiveFingerprint,
        payload: Vec<SymbolNode>,
    ) -> AgentResult<IndexOutcome> {
        let nodes = count_nodes(&payload);
        let fingerprint = match before {
            LiveFingerprint::Available(fingerprint) => fingerprint,
            LiveFingerprint::Unavailable { reason } => {
                return Ok(IndexOutcome::Uncached {
                    file: key.clone(),
                    nodes,
                    reason,
                });
            }
        };

        let after = self.source.fingerprint(key).await;
        if after.fingerprint() != Some(&fingerprint) {
            info!(file = %key, "file changed during fetch, not caching");
            return Ok(IndexOutcome::Changed { file: key.clone() });
        }

        self.cache.register(key.clone(), fingerprint, payload).await?;
        Ok(IndexOutcome::Indexed {
            file: key.clone(),
            nodes,
        })
    }
}

/// Accepts either a bare array of nodes or an object with a `symbols` array.
fn decode_symbols(key: &FileKey, response: Value) -> AgentResult<Vec<SymbolNode>> {
    let nodes = match response {
        Value::Object(mut object) if object.contains_key("symbols") => object
            .remove("symbols")
            .unwrap_or_default(),
        other => other,
    };
    serde_json::from_value(nodes).map_err(|cause| AgentError::Decode {
        file: key.clone(),
        cause,
    })
}
