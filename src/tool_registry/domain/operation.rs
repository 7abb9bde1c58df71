//! Operation metadata reported by an endpoint.

use super::ToolRegistryDomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One callable operation exposed by an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDefinition {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    input_schema: Value,
}

impl OperationDefinition {
    /// Creates an operation definition.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyOperationName`] when the name
    /// is empty after trimming.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Result<Self, ToolRegistryDomainError> {
        let normalized = name.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(ToolRegistryDomainError::EmptyOperationName);
        }

        Ok(Self {
            name: normalized,
            description: description.into().trim().to_owned(),
            input_schema,
        })
    }

    /// Returns the operation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the operation description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the JSON schema of the operation arguments.
    #[must_use]
    pub const fn input_schema(&self) -> &Value {
        &self.input_schema
    }
}
