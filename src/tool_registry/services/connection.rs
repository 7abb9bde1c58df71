//! Per-endpoint connection slot with serialised reconnects.

use crate::tool_registry::{
    domain::{ConnectionState, ConnectionStatus, EndpointConfig, EndpointName},
    ports::{EndpointHandle, EndpointResult, ToolEndpoint},
};
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct Slot {
    handle: Option<EndpointHandle>,
    state: ConnectionState,
}

/// Lazily established connection to one endpoint.
///
/// All connects for the endpoint go through one lock, so concurrent callers
/// that saw the same dropped connection trigger a single reconnect.
pub struct EndpointConnection<E, C>
where
    E: ToolEndpoint,
    C: Clock + Send + Sync,
{
    config: EndpointConfig,
    endpoint: Arc<E>,
    clock: Arc<C>,
    slot: Mutex<Slot>,
}

impl<E, C> EndpointConnection<E, C>
where
    E: ToolEndpoint,
    C: Clock + Send + Sync,
{
    /// Creates a disconnected slot for `config`.
    #[must_use]
    pub fn new(config: EndpointConfig, endpoint: Arc<E>, clock: Arc<C>) -> Self {
        Self {
            config,
            endpoint,
            clock,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Returns the endpoint name.
    #[must_use]
    pub const fn name(&self) -> &EndpointName {
        self.config.name()
    }

    /// Returns the endpoint configuration.
    #[must_use]
    pub const fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Returns the transport adapter.
    #[must_use]
    pub const fn transport(&self) -> &Arc<E> {
        &self.endpoint
    }

    /// Returns a snapshot of the connection state.
    pub async fn state(&self) -> ConnectionState {
        self.slot.lock().await.state.clone()
    }

    /// Returns the live handle and its generation, connecting first if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error when no connection can be established.
    pub async fn handle(&self) -> EndpointResult<(EndpointHandle, u64)> {
        let mut slot = self.slot.lock().await;
        if let Some(handle) = &slot.handle {
            return Ok((handle.clone(), slot.state.generation));
        }
        self.establish(&mut slot, false).await
    }

    /// Replaces the connection observed at `observed_generation`.
    ///
    /// When another caller already replaced it, the current connection is
    /// returned untouched.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error when the new connection cannot be
    /// established; the slot is then left disconnected.
    pub async fn reconnect(&self, observed_generation: u64) -> EndpointResult<(EndpointHandle, u64)> {
        let mut slot = self.slot.lock().await;
        if slot.state.generation != observed_generation
            && let Some(handle) = &slot.handle
        {
            debug!(
                endpoint = %self.name(),
                generation = slot.state.generation,
                "connection already replaced"
            );
            return Ok((handle.clone(), slot.state.generation));
        }

        if let Some(stale) = slot.handle.take()
            && let Err(err) = self.endpoint.close(&stale).await
        {
            debug!(endpoint = %self.name(), error = %err, "closing stale connection failed");
        }
        slot.state.status = ConnectionStatus::Disconnected;
        self.establish(&mut slot, true).await
    }

    /// Closes the connection if one is open.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error when closing fails; the slot is marked
    /// closed regardless.
    pub async fn close(&self) -> EndpointResult<()> {
        let mut slot = self.slot.lock().await;
        slot.state.status = ConnectionStatus::Closed;
        match slot.handle.take() {
            Some(handle) => self.endpoint.close(&handle).await,
            None => Ok(()),
        }
    }

    async fn establish(
        &self,
        slot: &mut Slot,
        replacing: bool,
    ) -> EndpointResult<(EndpointHandle, u64)> {
        match self.endpoint.connect(&self.config).await {
            Ok(handle) => {
                slot.state.generation += 1;
                if replacing {
                    slot.state.reconnect_count += 1;
                }
                slot.state.status = ConnectionStatus::Connected;
                slot.state.last_connected_at = Some(self.clock.utc());
                slot.state.last_error = None;
                slot.handle = Some(handle.clone());
                info!(
                    endpoint = %self.name(),
                    transport = %self.config.transport(),
                    generation = slot.state.generation,
                    reconnect = replacing,
                    "endpoint connected"
                );
                Ok((handle, slot.state.generation))
            }
            Err(err) => {
                warn!(endpoint = %self.name(), error = %err, "endpoint connect failed");
                slot.handle = None;
                slot.state.status = ConnectionStatus::Disconnected;
                slot.state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
