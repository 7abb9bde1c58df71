//! Unit tests for endpoint connections and the resilient invoker.


use crate::tool_registry::{
    adapters::ScriptedEndpoint,
    domain::{EndpointConfig, EndpointName, EndpointTransport, RetryPolicy, TimeoutPolicy},
    services::{EndpointRegistry, ResilientInvoker},
};
use mockable::DefaultClock;
use std::sync::Arc;

pub(super) fn endpoint_name(value: &str) -> EndpointName {
    EndpointName::new(value).expect("endpoint name should be valid")
}

pub(super) fn stdio_config(name: &str) -> EndpointConfig {
    let transport = EndpointTransport::stdio("symbol-server").expect("transport should be valid");
    EndpointConfig::new(endpoint_name(name), transport)
}

pub(super) struct InvokerContext {
    pub(super) endpoint: Arc<ScriptedEndpoint>,
    pub(super) invoker: ResilientInvoker<ScriptedEndpoint, DefaultClock>,
}

pub(super) fn invoker_context(timeouts: TimeoutPolicy) -> InvokerContext {
    let endpoint = Arc::new(ScriptedEndpoint::new());
    let registry = EndpointRegistry::new(
        Arc::clone(&endpoint),
        Arc::new(DefaultClock),
        [stdio_config("indexer"), stdio_config("shell")],
    )
    .expect("registry should build");
    let invoker = ResilientInvoker::new(Arc::new(registry), RetryPolicy::default(), timeouts);
    InvokerContext { endpoint, invoker }
}
