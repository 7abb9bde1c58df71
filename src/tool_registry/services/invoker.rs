//! Retrying, reconnecting invoker for remote tool calls.

use super::{EndpointConnection, EndpointRegistry};
use crate::tool_registry::{
    domain::{CallOptions, EndpointName, OperationDefinition, RetryPolicy, TimeoutPolicy},
    ports::{EndpointError, EndpointHandle, EndpointResult, ErrorClass, ToolEndpoint},
};
use futures::future::join_all;
use mockable::Clock;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors returned by [`ResilientInvoker`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokerError {
    /// No endpoint with this name is configured.
    #[error("unknown endpoint '{0}'")]
    UnknownEndpoint(EndpointName),

    /// The endpoint rejected the call; it was not retried.
    #[error("operation '{operation}' on '{endpoint}' failed: {source}")]
    Fatal {
        /// Endpoint called.
        endpoint: EndpointName,
        /// Operation called.
        operation: String,
        /// Endpoint error.
        #[source]
        source: EndpointError,
    },

    /// Every allowed attempt failed with a retryable error.
    #[error("operation '{operation}' on '{endpoint}' failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Endpoint called.
        endpoint: EndpointName,
        /// Operation called.
        operation: String,
        /// Attempts made.
        attempts: u32,
        /// Error of the final attempt.
        last: EndpointError,
    },
}

impl InvokerError {
    /// Returns the endpoint error behind the failure, if any.
    #[must_use]
    pub const fn endpoint_error(&self) -> Option<&EndpointError> {
        match self {
            Self::UnknownEndpoint(_) => None,
            Self::Fatal { source, .. } => Some(source),
            Self::RetriesExhausted { last, .. } => Some(last),
        }
    }
}

/// Result type for invoker operations.
pub type InvokerResult<T> = Result<T, InvokerError>;

/// One failed attempt of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationAttempt {
    /// Attempt number, starting at 1.
    pub attempt_number: u32,
    /// Error the attempt failed with.
    pub error: EndpointError,
    /// Classification of the error.
    pub class: ErrorClass,
    /// Backoff slept before the next attempt, if one followed.
    pub delay_applied: Option<Duration>,
}

/// Value of a successful call and the failed attempts that preceded it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Returned value.
    pub value: Value,
    /// Failed attempts in order.
    pub attempts: Vec<InvocationAttempt>,
}

/// One entry of a [`ResilientInvoker::call_all`] batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Endpoint to call.
    pub endpoint: EndpointName,
    /// Operation to invoke.
    pub operation: String,
    /// Operation arguments.
    pub args: Value,
    /// Per-call overrides.
    pub options: CallOptions,
}

impl ToolCall {
    /// Creates a call with default options.
    #[must_use]
    pub fn new(endpoint: EndpointName, operation: impl Into<String>, args: Value) -> Self {
        Self {
            endpoint,
            operation: operation.into(),
            args,
            options: CallOptions::default(),
        }
    }

    /// Sets per-call overrides.
    #[must_use]
    pub const fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }
}

/// Invokes operations on configured endpoints with timeouts, retries,
/// exponential backoff and reconnection.
pub struct ResilientInvoker<E, C>
where
    E: ToolEndpoint,
    C: Clock + Send + Sync,
{
    registry: Arc<EndpointRegistry<E, C>>,
    retry: RetryPolicy,
    timeouts: Arc<TimeoutPolicy>,
}

impl<E, C> Clone for ResilientInvoker<E, C>
where
    E: ToolEndpoint,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            retry: self.retry,
            timeouts: Arc::clone(&self.timeouts),
        }
    }
}

impl<E, C> ResilientInvoker<E, C>
where
    E: ToolEndpoint,
    C: Clock + Send + Sync,
{
    /// Creates an invoker over `registry`.
    #[must_use]
    pub fn new(
        registry: Arc<EndpointRegistry<E, C>>,
        retry: RetryPolicy,
        timeouts: TimeoutPolicy,
    ) -> Self {
        Self {
            registry,
            retry,
            timeouts: Arc::new(timeouts),
        }
    }

    /// Returns the endpoint registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<EndpointRegistry<E, C>> {
        &self.registry
    }

    /// Returns the default retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Invokes `operation` on `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::UnknownEndpoint`] for unconfigured endpoints,
    /// [`InvokerError::Fatal`] for non-retryable failures, and
    /// [`InvokerError::RetriesExhausted`] when every attempt failed.
    pub async fn call(
        &self,
        endpoint: &EndpointName,
        operation: &str,
        args: Value,
        options: CallOptions,
    ) -> InvokerResult<Value> {
        self.call_recorded(endpoint, operation, args, options)
            .await
            .map(|recorded| recorded.value)
    }

    /// Invokes `operation` and returns the value with the failed attempts
    /// that preceded it.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::call`].
    pub async fn call_recorded(
        &self,
        endpoint: &EndpointName,
        operation: &str,
        args: Value,
        options: CallOptions,
    ) -> InvokerResult<RecordedCall> {
        let connection = self.connection(endpoint)?;
        let retry = self.retry.with_overrides(&options);
        let timeout = options
            .timeout
            .unwrap_or_else(|| self.timeouts.timeout_for(operation));
        let transport = Arc::clone(connection.transport());

        let (value, attempts) =
            Self::with_retry(connection, operation, retry, timeout, |handle| {
                let call_args = args.clone();
                let call_transport = Arc::clone(&transport);
                async move {
                    call_transport
                        .invoke(&handle, operation, call_args, timeout)
                        .await
                }
            })
            .await?;
        Ok(RecordedCall { value, attempts })
    }

    /// Runs every call concurrently and returns the outcomes in input order.
    ///
    /// Each call settles independently; one failure does not cancel the
    /// others.
    pub async fn call_all(&self, calls: Vec<ToolCall>) -> Vec<InvokerResult<Value>> {
        let pending = calls.into_iter().map(|call| async move {
            self.call(&call.endpoint, &call.operation, call.args, call.options)
                .await
        });
        join_all(pending).await
    }

    /// Lists the operations `endpoint` exposes, on the short timeout tier.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::call`].
    pub async fn list_operations(
        &self,
        endpoint: &EndpointName,
    ) -> InvokerResult<Vec<OperationDefinition>> {
        const OPERATION: &str = "list_operations";
        let connection = self.connection(endpoint)?;
        let timeout = self.timeouts.short();
        let transport = Arc::clone(connection.transport());

        let (operations, _) =
            Self::with_retry(connection, OPERATION, self.retry, timeout, |handle| {
                let list_transport = Arc::clone(&transport);
                async move { list_transport.list_operations(&handle).await }
            })
            .await?;
        Ok(operations)
    }

    fn connection(&self, endpoint: &EndpointName) -> InvokerResult<&EndpointConnection<E, C>> {
        self.registry
            .get(endpoint)
            .map(Arc::as_ref)
            .ok_or_else(|| InvokerError::UnknownEndpoint(endpoint.clone()))
    }

    async fn with_retry<T, F, Fut>(
        connection: &EndpointConnection<E, C>,
        operation: &str,
        retry: RetryPolicy,
        timeout: Duration,
        attempt_call: F,
    ) -> InvokerResult<(T, Vec<InvocationAttempt>)>
    where
        F: Fn(EndpointHandle) -> Fut + Send + Sync,
        Fut: Future<Output = EndpointResult<T>> + Send,
        T: Send,
    {
        let endpoint = connection.name();
        let mut attempts = Vec::new();
        let mut attempt: u32 = 1;

        loop {
            let mut generation = None;
            let outcome = bounded(operation, timeout, async {
                let (handle, observed) = connection.handle().await?;
                generation = Some(observed);
                attempt_call(handle).await
            })
            .await;

            let error = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        info!(%endpoint, operation, attempt, "call succeeded after retry");
                    }
                    return Ok((value, attempts));
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                debug!(%endpoint, operation, error = %error, "fatal endpoint error");
                return Err(InvokerError::Fatal {
                    endpoint: endpoint.clone(),
                    operation: operation.to_owned(),
                    source: error,
                });
            }

            if attempt >= retry.max_retries() {
                warn!(%endpoint, operation, attempts = attempt, error = %error, "retries exhausted");
                return Err(InvokerError::RetriesExhausted {
                    endpoint: endpoint.clone(),
                    operation: operation.to_owned(),
                    attempts: attempt,
                    last: error,
                });
            }

            if error.drops_connection()
                && let Some(observed) = generation
                && let Err(reconnect_error) =
                    bounded(operation, timeout, connection.reconnect(observed)).await
            {
                warn!(%endpoint, error = %reconnect_error, "reconnect failed");
            }

            let delay = retry.delay_for(attempt);
            warn!(
                %endpoint,
                operation,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "retryable endpoint error, backing off"
            );
            attempts.push(InvocationAttempt {
                attempt_number: attempt,
                class: error.class(),
                error,
                delay_applied: Some(delay),
            });
            tokio::time::sleep(delay).await;
            attempt = attempt.saturating_add(1);
        }
    }
}

async fn bounded<T>(
    operation: &str,
    timeout: Duration,
    call: impl Future<Output = EndpointResult<T>>,
) -> EndpointResult<T> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or_else(|_| {
            Err(EndpointError::Timeout {
                operation: operation.to_owned(),
                elapsed: timeout,
            })
        })
}
