//! Retry, backoff and timeout policies for endpoint calls.

use super::ToolRegistryDomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Default number of attempts per call.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay before the second attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);
/// Default timeout for long-running operations.
pub const DEFAULT_LONG_TIMEOUT: Duration = Duration::from_secs(300);
/// Default timeout for metadata-style operations.
pub const DEFAULT_SHORT_TIMEOUT: Duration = Duration::from_secs(30);

/// Exponential backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy allowing `max_retries` total attempts.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::ZeroRetries`] when `max_retries`
    /// is zero.
    pub const fn new(max_retries: u32, base_delay: Duration) -> Result<Self, ToolRegistryDomainError> {
        if max_retries == 0 {
            return Err(ToolRegistryDomainError::ZeroRetries);
        }
        Ok(Self {
            max_retries,
            base_delay,
        })
    }

    /// Returns the total number of attempts allowed.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the delay applied after the first failed attempt.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns the delay to wait after failed attempt number `attempt`
    /// (starting at 1): `base_delay * 2^(attempt - 1)`, saturating.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 2_u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Applies per-call overrides.
    #[must_use]
    pub fn with_overrides(self, options: &CallOptions) -> Self {
        Self {
            max_retries: options.max_retries.unwrap_or(self.max_retries).max(1),
            base_delay: options.base_delay.unwrap_or(self.base_delay),
        }
    }
}

/// Two-tier timeout policy.
///
/// Operations named in the long-running set get the long timeout; all
/// others get the short metadata timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutPolicy {
    long: Duration,
    short: Duration,
    long_running_operations: BTreeSet<String>,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_TIMEOUT, DEFAULT_SHORT_TIMEOUT)
            .with_long_running(["run_shell".to_owned(), "execute_command".to_owned()])
    }
}

impl TimeoutPolicy {
    /// Creates a policy with no long-running operations.
    #[must_use]
    pub const fn new(long: Duration, short: Duration) -> Self {
        Self {
            long,
            short,
            long_running_operations: BTreeSet::new(),
        }
    }

    /// Replaces the set of long-running operation names.
    #[must_use]
    pub fn with_long_running(mut self, operations: impl IntoIterator<Item = String>) -> Self {
        self.long_running_operations = operations.into_iter().collect();
        self
    }

    /// Returns the long-tier timeout.
    #[must_use]
    pub const fn long(&self) -> Duration {
        self.long
    }

    /// Returns the short-tier timeout.
    #[must_use]
    pub const fn short(&self) -> Duration {
        self.short
    }

    /// Returns the long-running operation names in order.
    pub fn long_running_operations(&self) -> impl Iterator<Item = &String> {
        self.long_running_operations.iter()
    }

    /// Returns the default timeout for `operation`.
    #[must_use]
    pub fn timeout_for(&self, operation: &str) -> Duration {
        if self.long_running_operations.contains(operation) {
            self.long
        } else {
            self.short
        }
    }
}

/// Per-call overrides of the invoker defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOptions {
    /// Timeout for each attempt.
    pub timeout: Option<Duration>,
    /// Total number of attempts.
    pub max_retries: Option<u32>,
    /// Delay after the first failed attempt.
    pub base_delay: Option<Duration>,
}

impl CallOptions {
    /// Overrides the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the total number of attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Overrides the base backoff delay.
    #[must_use]
    pub const fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = Some(base_delay);
        self
    }
}
