//! Shared wiring for in-memory integration tests.

use std::sync::Arc;

use armature::{
    agent::{
        domain::IndexerSettings,
        services::{CommandService, SymbolIndexService},
    },
    config::SubstrateConfig,
    store::adapters::InMemoryDurableStore,
    symbol_cache::{adapters::InMemorySourceReader, domain::FileKey, services::SymbolCache},
    task::{adapters::StoreTaskSnapshotRepository, services::TaskPlanService},
    tool_registry::{
        adapters::ScriptedEndpoint,
        domain::{EndpointConfig, EndpointName, EndpointTransport},
        services::{EndpointRegistry, ResilientInvoker},
    },
};
use mockable::DefaultClock;
use serde_json::{Value, json};

/// Snapshot repository used by the harness.
pub type TestSnapshots = StoreTaskSnapshotRepository<InMemoryDurableStore>;
/// Plan service used by the harness.
pub type TestPlans = TaskPlanService<TestSnapshots, DefaultClock>;
/// Indexer used by the harness.
pub type TestIndexer =
    SymbolIndexService<InMemoryDurableStore, InMemorySourceReader, ScriptedEndpoint, DefaultClock>;
/// Command service used by the harness.
pub type TestCommands = CommandService<
    InMemoryDurableStore,
    InMemorySourceReader,
    ScriptedEndpoint,
    TestSnapshots,
    DefaultClock,
>;

/// Services wired over shared in-memory adapters.
///
/// Building a second harness over the same store models a process restart.
pub struct Substrate {
    pub store: Arc<InMemoryDurableStore>,
    pub source: Arc<InMemorySourceReader>,
    pub endpoint: Arc<ScriptedEndpoint>,
    pub invoker: ResilientInvoker<ScriptedEndpoint, DefaultClock>,
    pub indexer: TestIndexer,
    pub plans: TestPlans,
}

impl Substrate {
    /// Wires a fresh session over `store`, restoring any persisted plan.
    pub async fn start(
        store: Arc<InMemoryDurableStore>,
        source: Arc<InMemorySourceReader>,
        endpoint: Arc<ScriptedEndpoint>,
    ) -> eyre::Result<Self> {
        let config = SubstrateConfig::default();
        let clock = Arc::new(DefaultClock);
        let settings: IndexerSettings = config.indexer_settings()?;

        let registry = EndpointRegistry::new(
            Arc::clone(&endpoint),
            Arc::clone(&clock),
            [EndpointConfig::new(
                settings.endpoint().clone(),
                EndpointTransport::stdio("symbol-bridge")?,
            )],
        )?;
        let invoker = ResilientInvoker::new(
            Arc::new(registry),
            config.retry_policy()?,
            config.timeout_policy(),
        );

        let cache = SymbolCache::with_key_prefix(
            Arc::clone(&store),
            Arc::clone(&clock),
            &config.cache.key_prefix,
        );
        let indexer =
            SymbolIndexService::new(cache, Arc::clone(&source), invoker.clone(), settings);
        let snapshots = Arc::new(StoreTaskSnapshotRepository::with_key(
            Arc::clone(&store),
            config.tasks.snapshot_key.as_str(),
        ));
        let plans = TaskPlanService::restore(snapshots, clock).await?;

        Ok(Self {
            store,
            source,
            endpoint,
            invoker,
            indexer,
            plans,
        })
    }

    /// Wires a session over empty adapters.
    pub async fn fresh() -> eyre::Result<Self> {
        Self::start(
            Arc::new(InMemoryDurableStore::new()),
            Arc::new(InMemorySourceReader::new()),
            Arc::new(ScriptedEndpoint::new()),
        )
        .await
    }

    /// Wires a new session over this session's adapters.
    pub async fn restart(&self) -> eyre::Result<Self> {
        Self::start(
            Arc::clone(&self.store),
            Arc::clone(&self.source),
            Arc::clone(&self.endpoint),
        )
        .await
    }

    /// Returns a command service over this session.
    pub fn commands(&self) -> TestCommands {
        CommandService::new(self.indexer.clone(), self.plans.clone())
    }

    /// Writes `contents` to `path` in the source reader.
    pub fn write_source(&self, path: &str, contents: &str) -> eyre::Result<FileKey> {
        let key = FileKey::new(path)?;
        self.source.write(&key, contents);
        Ok(key)
    }
}

/// Name of the default indexer endpoint.
pub fn symbol_endpoint() -> EndpointName {
    EndpointName::new("lsp").expect("endpoint name should be valid")
}

/// Symbol tree with one struct holding `methods`.
pub fn struct_tree(name: &str, methods: &[&str]) -> Value {
    let children: Vec<Value> = methods
        .iter()
        .map(|method| json!({"name": method, "kind": "method"}))
        .collect();
    json!([{"name": name, "kind": "struct", "children": children}])
}
