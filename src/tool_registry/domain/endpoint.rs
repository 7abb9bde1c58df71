//! Endpoint configuration and connection state records.

use super::{EndpointName, EndpointTransport, ParseConnectionStatusError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static configuration of one remote tool endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    name: EndpointName,
    transport: EndpointTransport,
}

impl EndpointConfig {
    /// Creates an endpoint configuration.
    #[must_use]
    pub const fn new(name: EndpointName, transport: EndpointTransport) -> Self {
        Self { name, transport }
    }

    /// Returns the endpoint name.
    #[must_use]
    pub const fn name(&self) -> &EndpointName {
        &self.name
    }

    /// Returns the transport settings.
    #[must_use]
    pub const fn transport(&self) -> &EndpointTransport {
        &self.transport
    }
}

/// Connection status of an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No live connection.
    #[default]
    Disconnected,
    /// A connection is established.
    Connected,
    /// The connection was closed on request.
    Closed,
}

impl ConnectionStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ConnectionStatus {
    type Error = ParseConnectionStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disconnected" => Ok(Self::Disconnected),
            "connected" => Ok(Self::Connected),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseConnectionStatusError(value.to_owned())),
        }
    }
}

/// Observable state of an endpoint's connection.
///
/// The generation increases every time a new connection is established, so
/// a caller holding a stale generation knows its connection was replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    /// Current status.
    pub status: ConnectionStatus,
    /// Number of connections established so far.
    pub generation: u64,
    /// Number of connections established to replace a dropped one.
    pub reconnect_count: u64,
    /// When the current connection was established.
    pub last_connected_at: Option<DateTime<Utc>>,
    /// Most recent connection failure.
    pub last_error: Option<String>,
}
