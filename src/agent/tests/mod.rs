//! Unit tests for the indexer, executor and command service.


use crate::agent::{
    domain::IndexerSettings,
    services::{CommandService, SymbolIndexService},
};
use crate::store::adapters::InMemoryDurableStore;
use crate::symbol_cache::{adapters::InMemorySourceReader, domain::FileKey, services::SymbolCache};
use crate::task::{adapters::StoreTaskSnapshotRepository, services::TaskPlanService};
use crate::tool_registry::{
    adapters::ScriptedEndpoint,
    domain::{EndpointConfig, EndpointName, EndpointTransport, RetryPolicy, TimeoutPolicy},
    services::{EndpointRegistry, ResilientInvoker},
};
use mockable::DefaultClock;
use std::sync::Arc;

pub(super) type TestIndexer =
    SymbolIndexService<InMemoryDurableStore, InMemorySourceReader, ScriptedEndpoint, DefaultClock>;
pub(super) type TestPlans =
    TaskPlanService<StoreTaskSnapshotRepository<InMemoryDurableStore>, DefaultClock>;
pub(super) type TestCommands = CommandService<
    InMemoryDurableStore,
    InMemorySourceReader,
    ScriptedEndpoint,
    StoreTaskSnapshotRepository<InMemoryDurableStore>,
    DefaultClock,
>;

/// Operation the indexer calls in these tests.
pub(super) const SYMBOLS: &str = "document_symbols";

pub(super) fn file_key(value: &str) -> FileKey {
    FileKey::new(value).expect("file key should be valid")
}

pub(super) fn lsp() -> EndpointName {
    EndpointName::new("lsp").expect("endpoint name should be valid")
}

/// Every collaborator of the agent services, backed by in-memory adapters.
pub(super) struct AgentHarness {
    pub(super) store: Arc<InMemoryDurableStore>,
    pub(super) source: Arc<InMemorySourceReader>,
    pub(super) endpoint: Arc<ScriptedEndpoint>,
    pub(super) invoker: ResilientInvoker<ScriptedEndpoint, DefaultClock>,
    pub(super) indexer: TestIndexer,
    pub(super) plans: TestPlans,
}

impl AgentHarness {
    pub(super) fn new() -> Self {
        let store = Arc::new(InMemoryDurableStore::new());
        let source = Arc::new(InMemorySourceReader::new());
        let endpoint = Arc::new(ScriptedEndpoint::new());
        let clock = Arc::new(DefaultClock);

        let transport = EndpointTransport::stdio("lsp-bridge").expect("transport should be valid");
        let registry = EndpointRegistry::new(
            Arc::clone(&endpoint),
            Arc::clone(&clock),
            [EndpointConfig::new(lsp(), transport)],
        )
        .expect("registry should build");
        let invoker = ResilientInvoker::new(
            Arc::new(registry),
            RetryPolicy::default(),
            TimeoutPolicy::default(),
        );

        let cache = SymbolCache::new(Arc::clone(&store), Arc::clone(&clock));
        let indexer = SymbolIndexService::new(
            cache,
            Arc::clone(&source),
            invoker.clone(),
            IndexerSettings::new(lsp()),
        );
        let plans = TaskPlanService::new(
            Arc::new(StoreTaskSnapshotRepository::new(Arc::clone(&store))),
            clock,
        );

        Self {
            store,
            source,
            endpoint,
            invoker,
            indexer,
            plans,
        }
    }

    pub(super) fn commands(&self) -> TestCommands {
        CommandService::new(self.indexer.clone(), self.plans.clone())
    }
}
