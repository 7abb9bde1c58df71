//! In-memory endpoint adapter driven by scripted responses.

use crate::tool_registry::{
    domain::{EndpointConfig, EndpointName, OperationDefinition},
    ports::{EndpointError, EndpointHandle, EndpointResult, ToolEndpoint},
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One scripted reaction to an `invoke` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedResponse {
    /// Return the value immediately.
    Reply(Value),
    /// Fail with the error. Errors that drop the connection also kill the
    /// session that received them.
    Fail(EndpointError),
    /// Wait for the duration, then return the value.
    Stall(Duration, Value),
}

/// Something the endpoint observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    /// A session was opened.
    Connected {
        /// Endpoint name.
        endpoint: EndpointName,
        /// New session number.
        session: u64,
    },
    /// An operation was invoked on a live session.
    Invoked {
        /// Endpoint name.
        endpoint: EndpointName,
        /// Operation name.
        operation: String,
        /// Session used.
        session: u64,
    },
    /// A session was closed.
    Closed {
        /// Endpoint name.
        endpoint: EndpointName,
        /// Closed session number.
        session: u64,
    },
}

/// Scriptable in-memory endpoint.
///
/// Each `(endpoint, operation)` pair has a queue of responses; once a queue
/// is empty, calls echo their arguments back. Clones share state, so tests
/// can script and inspect the same endpoint the invoker talks to.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEndpoint {
    state: Arc<Mutex<ScriptState>>,
}

#[derive(Debug, Default)]
struct ScriptState {
    next_session: u64,
    live_sessions: HashSet<EndpointHandle>,
    responses: HashMap<(EndpointName, String), VecDeque<ScriptedResponse>>,
    connect_failures: HashMap<EndpointName, VecDeque<EndpointError>>,
    catalogs: HashMap<EndpointName, Vec<OperationDefinition>>,
    connect_delay: Duration,
    connecting: HashMap<EndpointName, usize>,
    max_connecting: HashMap<EndpointName, usize>,
    events: Vec<ScriptEvent>,
}

impl ScriptedEndpoint {
    /// Creates an endpoint with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues responses for `operation` on `endpoint`.
    pub fn script(
        &self,
        endpoint: &EndpointName,
        operation: &str,
        responses: impl IntoIterator<Item = ScriptedResponse>,
    ) {
        self.lock()
            .responses
            .entry((endpoint.clone(), operation.to_owned()))
            .or_default()
            .extend(responses);
    }

    /// Makes the next connection attempts to `endpoint` fail, one error per
    /// attempt.
    pub fn fail_connects(
        &self,
        endpoint: &EndpointName,
        errors: impl IntoIterator<Item = EndpointError>,
    ) {
        self.lock()
            .connect_failures
            .entry(endpoint.clone())
            .or_default()
            .extend(errors);
    }

    /// Sets the operations `endpoint` reports.
    pub fn set_catalog(&self, endpoint: &EndpointName, operations: Vec<OperationDefinition>) {
        self.lock().catalogs.insert(endpoint.clone(), operations);
    }

    /// Makes every connection attempt take `delay`.
    pub fn set_connect_delay(&self, delay: Duration) {
        self.lock().connect_delay = delay;
    }

    /// Kills every live session of `endpoint` without telling the caller.
    pub fn drop_sessions(&self, endpoint: &EndpointName) {
        self.lock()
            .live_sessions
            .retain(|handle| handle.endpoint() != endpoint);
    }

    /// Returns every observed event in order.
    #[must_use]
    pub fn events(&self) -> Vec<ScriptEvent> {
        self.lock().events.clone()
    }

    /// Returns how many sessions were opened to `endpoint`.
    #[must_use]
    pub fn connect_count(&self, endpoint: &EndpointName) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|event| {
                matches!(event, ScriptEvent::Connected { endpoint: seen, .. } if seen == endpoint)
            })
            .count()
    }

    /// Returns how many invocations reached `endpoint`.
    #[must_use]
    pub fn invoke_count(&self, endpoint: &EndpointName) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|event| {
                matches!(event, ScriptEvent::Invoked { endpoint: seen, .. } if seen == endpoint)
            })
            .count()
    }

    /// Returns the highest number of overlapping connection attempts seen
    /// for `endpoint`.
    #[must_use]
    pub fn max_concurrent_connects(&self, endpoint: &EndpointName) -> usize {
        self.lock()
            .max_connecting
            .get(endpoint)
            .copied()
            .unwrap_or_default()
    }

    fn ensure_live(state: &ScriptState, handle: &EndpointHandle) -> EndpointResult<()> {
        if state.live_sessions.contains(handle) {
            Ok(())
        } else {
            Err(EndpointError::Disconnected(format!("session {handle} is closed")))
        }
    }
}

#[async_trait]
impl ToolEndpoint for ScriptedEndpoint {
    async fn connect(&self, config: &EndpointConfig) -> EndpointResult<EndpointHandle> {
        let endpoint = config.name().clone();
        let delay = {
            let mut state = self.lock();
            let in_flight = {
                let counter = state.connecting.entry(endpoint.clone()).or_default();
                *counter += 1;
                *counter
            };
            let peak = state.max_connecting.entry(endpoint.clone()).or_default();
            *peak = (*peak).max(in_flight);
            state.connect_delay
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        if let Some(counter) = state.connecting.get_mut(&endpoint) {
            *counter = counter.saturating_sub(1);
        }
        if let Some(error) = state
            .connect_failures
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }

        state.next_session += 1;
        let handle = EndpointHandle::new(endpoint.clone(), state.next_session);
        state.live_sessions.insert(handle.clone());
        state.events.push(ScriptEvent::Connected {
            endpoint,
            session: handle.session(),
        });
        Ok(handle)
    }

    async fn list_operations(
        &self,
        handle: &EndpointHandle,
    ) -> EndpointResult<Vec<OperationDefinition>> {
        let state = self.lock();
        Self::ensure_live(&state, handle)?;
        Ok(state
            .catalogs
            .get(handle.endpoint())
            .cloned()
            .unwrap_or_default())
    }

    async fn invoke(
        &self,
        handle: &EndpointHandle,
        operation: &str,
        args: Value,
        _timeout: Duration,
    ) -> EndpointResult<Value> {
        let response = {
            let mut state = self.lock();
            Self::ensure_live(&state, handle)?;
            state.events.push(ScriptEvent::Invoked {
                endpoint: handle.endpoint().clone(),
                operation: operation.to_owned(),
                session: handle.session(),
            });
            let scripted = state
                .responses
                .get_mut(&(handle.endpoint().clone(), operation.to_owned()))
                .and_then(VecDeque::pop_front);
            if let Some(ScriptedResponse::Fail(ref error)) = scripted
                && error.drops_connection()
            {
                state.live_sessions.remove(handle);
            }
            scripted
        };

        match response {
            Some(ScriptedResponse::Reply(value)) => Ok(value),
            Some(ScriptedResponse::Fail(error)) => Err(error),
            Some(ScriptedResponse::Stall(delay, value)) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            None => Ok(json!({
                "endpoint": handle.endpoint().as_str(),
                "operation": operation,
                "args": args,
            })),
        }
    }

    async fn close(&self, handle: &EndpointHandle) -> EndpointResult<()> {
        let mut state = self.lock();
        if state.live_sessions.remove(handle) {
            state.events.push(ScriptEvent::Closed {
                endpoint: handle.endpoint().clone(),
                session: handle.session(),
            });
        }
        Ok(())
    }
}
