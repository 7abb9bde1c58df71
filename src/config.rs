//! Layered configuration for the substrate services.
//!
//! Values come from built-in defaults, then an optional TOML or JSON file,
//! then `SUBSTRATE__`-prefixed environment variables with `__` separating
//! nested keys (for example `SUBSTRATE__INVOKER__MAX_RETRIES=5`).

use crate::agent::domain::{DEFAULT_PATH_ARGUMENT, DEFAULT_SYMBOL_OPERATION, IndexerSettings};
use crate::symbol_cache::services::DEFAULT_KEY_PREFIX;
use crate::task::adapters::DEFAULT_SNAPSHOT_KEY;
use crate::tool_registry::domain::{
    DEFAULT_BASE_DELAY, DEFAULT_LONG_TIMEOUT, DEFAULT_MAX_RETRIES, DEFAULT_SHORT_TIMEOUT,
    EndpointName, RetryPolicy, TimeoutPolicy, ToolRegistryDomainError,
};
use camino::Utf8Path;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Prefix of environment variables read by [`SubstrateConfig::load`].
pub const ENV_PREFIX: &str = "SUBSTRATE";

/// Errors raised while loading or applying configuration.
#[derive(Debug, Error)]
pub enum SubstrateConfigError {
    /// A source could not be read or deserialised.
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    /// A value failed domain validation.
    #[error(transparent)]
    Invalid(#[from] ToolRegistryDomainError),
}

/// Result type for configuration operations.
pub type SubstrateConfigResult<T> = Result<T, SubstrateConfigError>;

/// Root configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstrateConfig {
    /// Symbol cache settings.
    pub cache: CacheSection,
    /// Task graph settings.
    pub tasks: TasksSection,
    /// Remote invocation settings.
    pub invoker: InvokerSection,
    /// Symbol indexer settings.
    pub indexer: IndexerSection,
    /// Log output settings.
    pub logging: LoggingSection,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Store key prefix for persisted entries.
    pub key_prefix: String,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_owned(),
        }
    }
}

/// `[tasks]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksSection {
    /// Store key holding the task graph snapshot.
    pub snapshot_key: String,
}

impl Default for TasksSection {
    fn default() -> Self {
        Self {
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_owned(),
        }
    }
}

/// `[invoker]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokerSection {
    /// Total attempts per call.
    pub max_retries: u32,
    /// Backoff after the first failed attempt, in milliseconds.
    pub base_delay_ms: u64,
    /// Timeout for long-running operations, in seconds.
    pub long_timeout_secs: u64,
    /// Timeout for every other operation, in seconds.
    pub short_timeout_secs: u64,
    /// Operations that get the long timeout.
    pub long_running_operations: Vec<String>,
}

impl Default for InvokerSection {
    fn default() -> Self {
        let timeouts = TimeoutPolicy::default();
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: u64::try_from(DEFAULT_BASE_DELAY.as_millis()).unwrap_or(u64::MAX),
            long_timeout_secs: DEFAULT_LONG_TIMEOUT.as_secs(),
            short_timeout_secs: DEFAULT_SHORT_TIMEOUT.as_secs(),
            long_running_operations: timeouts.long_running_operations().cloned().collect(),
        }
    }
}

/// `[indexer]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerSection {
    /// Endpoint symbol trees are fetched from.
    pub endpoint: String,
    /// Operation returning a file's symbol tree.
    pub operation: String,
    /// Argument carrying the file path.
    pub path_argument: String,
}

impl Default for IndexerSection {
    fn default() -> Self {
        Self {
            endpoint: "lsp".to_owned(),
            operation: DEFAULT_SYMBOL_OPERATION.to_owned(),
            path_argument: DEFAULT_PATH_ARGUMENT.to_owned(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default filter directive; `RUST_LOG` overrides it.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl SubstrateConfig {
    /// Loads defaults, then `path` when given, then the environment.
    ///
    /// # Errors
    ///
    /// Returns [`SubstrateConfigError::Load`] when the file is missing or
    /// malformed, or a value has the wrong type.
    pub fn load(path: Option<&Utf8Path>) -> SubstrateConfigResult<Self> {
        let mut builder = Config::builder();
        if let Some(file) = path {
            builder = builder.add_source(File::from(file.as_std_path()).required(true));
        }
        Self::from_builder(builder.add_source(environment()))
    }

    /// Builds the configuration from prepared sources.
    ///
    /// # Errors
    ///
    /// Returns [`SubstrateConfigError::Load`] when a source cannot be read
    /// or deserialised.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> SubstrateConfigResult<Self> {
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Returns the configured retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::ZeroRetries`] when `max_retries`
    /// is zero.
    pub fn retry_policy(&self) -> SubstrateConfigResult<RetryPolicy> {
        Ok(RetryPolicy::new(
            self.invoker.max_retries,
            Duration::from_millis(self.invoker.base_delay_ms),
        )?)
    }

    /// Returns the configured timeout tiers.
    #[must_use]
    pub fn timeout_policy(&self) -> TimeoutPolicy {
        TimeoutPolicy::new(
            Duration::from_secs(self.invoker.long_timeout_secs),
            Duration::from_secs(self.invoker.short_timeout_secs),
        )
        .with_long_running(self.invoker.long_running_operations.iter().cloned())
    }

    /// Returns the configured indexer settings.
    ///
    /// # Errors
    ///
    /// Returns [`SubstrateConfigError::Invalid`] when the endpoint name is
    /// not valid.
    pub fn indexer_settings(&self) -> SubstrateConfigResult<IndexerSettings> {
        let endpoint = EndpointName::new(self.indexer.endpoint.as_str())?;
        Ok(IndexerSettings::new(endpoint)
            .with_operation(self.indexer.operation.as_str())
            .with_path_argument(self.indexer.path_argument.as_str()))
    }
}

/// Environment source for [`ENV_PREFIX`] variables.
///
/// `invoker.long_running_operations` is read as a comma-separated list.
#[must_use]
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("invoker.long_running_operations")
}
