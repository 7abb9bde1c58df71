//! Fixed set of endpoint connections.

use super::EndpointConnection;
use crate::tool_registry::{
    domain::{ConnectionState, EndpointConfig, EndpointName},
    ports::ToolEndpoint,
};
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while assembling a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointRegistryError {
    /// Two configurations share a name.
    #[error("endpoint '{0}' is configured more than once")]
    DuplicateEndpoint(EndpointName),
}

/// Connections to every configured endpoint, keyed by name.
///
/// The set of endpoints is fixed at construction; each connection carries
/// its own lock and state.
pub struct EndpointRegistry<E, C>
where
    E: ToolEndpoint,
    C: Clock + Send + Sync,
{
    connections: BTreeMap<EndpointName, Arc<EndpointConnection<E, C>>>,
}

impl<E, C> EndpointRegistry<E, C>
where
    E: ToolEndpoint,
    C: Clock + Send + Sync,
{
    /// Builds a registry with one disconnected slot per configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointRegistryError::DuplicateEndpoint`] when two
    /// configurations share a name.
    pub fn new(
        endpoint: Arc<E>,
        clock: Arc<C>,
        configs: impl IntoIterator<Item = EndpointConfig>,
    ) -> Result<Self, EndpointRegistryError> {
        let mut connections = BTreeMap::new();
        for config in configs {
            let name = config.name().clone();
            if connections.contains_key(&name) {
                return Err(EndpointRegistryError::DuplicateEndpoint(name));
            }
            debug!(endpoint = %name, "endpoint registered");
            let connection =
                EndpointConnection::new(config, Arc::clone(&endpoint), Arc::clone(&clock));
            connections.insert(name, Arc::new(connection));
        }
        Ok(Self { connections })
    }

    /// Returns the connection for `name`.
    #[must_use]
    pub fn get(&self, name: &EndpointName) -> Option<&Arc<EndpointConnection<E, C>>> {
        self.connections.get(name)
    }

    /// Returns the configured endpoint names in order.
    pub fn names(&self) -> impl Iterator<Item = &EndpointName> {
        self.connections.keys()
    }

    /// Returns the number of configured endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` when no endpoint is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Returns the connection state of every endpoint.
    pub async fn states(&self) -> Vec<(EndpointName, ConnectionState)> {
        let mut states = Vec::with_capacity(self.connections.len());
        for (name, connection) in &self.connections {
            states.push((name.clone(), connection.state().await));
        }
        states
    }

    /// Closes every open connection, continuing past failures.
    ///
    /// Returns the endpoints whose close failed.
    pub async fn close_all(&self) -> Vec<EndpointName> {
        let mut failed = Vec::new();
        for (name, connection) in &self.connections {
            if let Err(err) = connection.close().await {
                debug!(endpoint = %name, error = %err, "endpoint close failed");
                failed.push(name.clone());
            }
        }
        failed
    }
}
