//! How an endpoint is reached: a child process over STDIO or a server
//! speaking HTTP with server-sent events.

use super::ToolRegistryDomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A child process launched per connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdioTransportConfig {
    program: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
}

impl StdioTransportConfig {
    /// Creates a transport launching `program` with no arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyStdioCommand`] when `program`
    /// is blank.
    pub fn new(program: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        let trimmed = program.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(ToolRegistryDomainError::EmptyStdioCommand);
        }
        Ok(Self {
            program: trimmed,
            args: Vec::new(),
            env: BTreeMap::new(),
        })
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Sets one environment variable for the child, replacing any earlier
    /// value for `key`.
    #[must_use]
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Returns the program to launch.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments in order.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the environment additions.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}

/// A server reached over HTTP, streaming responses as server-sent events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSseTransportConfig {
    base_url: String,
}

impl HttpSseTransportConfig {
    /// Creates a transport rooted at `base_url`, dropping trailing slashes.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyHttpSseBaseUrl`] for a blank
    /// URL and [`ToolRegistryDomainError::InvalidHttpSseBaseUrl`] when the
    /// scheme is not `http` or `https`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        let raw = base_url.into();
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ToolRegistryDomainError::EmptyHttpSseBaseUrl);
        }
        let scheme_ok = ["http://", "https://"]
            .iter()
            .any(|scheme| trimmed.starts_with(scheme) && trimmed.len() > scheme.len());
        if !scheme_ok {
            return Err(ToolRegistryDomainError::InvalidHttpSseBaseUrl(
                trimmed.to_owned(),
            ));
        }
        Ok(Self {
            base_url: trimmed.to_owned(),
        })
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// How an endpoint is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "config")]
pub enum EndpointTransport {
    /// Child process over STDIO.
    Stdio(StdioTransportConfig),
    /// Remote server over HTTP+SSE.
    HttpSse(HttpSseTransportConfig),
}

impl EndpointTransport {
    /// Creates a STDIO transport launching `program`.
    ///
    /// # Errors
    ///
    /// Fails like [`StdioTransportConfig::new`].
    pub fn stdio(program: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        StdioTransportConfig::new(program).map(Self::Stdio)
    }

    /// Creates an HTTP+SSE transport rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Fails like [`HttpSseTransportConfig::new`].
    pub fn http_sse(base_url: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        HttpSseTransportConfig::new(base_url).map(Self::HttpSse)
    }

    /// Returns the serialised kind tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Stdio(_) => "stdio",
            Self::HttpSse(_) => "http_sse",
        }
    }
}

impl fmt::Display for EndpointTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio(config) => {
                write!(f, "stdio:{}", config.program())?;
                for arg in config.args() {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
            Self::HttpSse(config) => write!(f, "http_sse:{}", config.base_url()),
        }
    }
}
