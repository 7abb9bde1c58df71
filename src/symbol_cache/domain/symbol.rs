//! Symbol tree value objects.

use super::{ParseSymbolKindError, SymbolCacheDomainError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind tag attached to each symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Module or file-level scope.
    Module,
    /// Namespace or package.
    Namespace,
    /// Class declaration.
    Class,
    /// Struct declaration.
    Struct,
    /// Enum declaration.
    Enum,
    /// Interface declaration.
    Interface,
    /// Trait declaration.
    Trait,
    /// Free function.
    Function,
    /// Method bound to a type.
    Method,
    /// Constructor.
    Constructor,
    /// Field of a type.
    Field,
    /// Property accessor.
    Property,
    /// Variable binding.
    Variable,
    /// Constant.
    Constant,
    /// Type alias.
    TypeAlias,
    /// Any tag the endpoint reports that is not recognised.
    #[serde(other)]
    Unknown,
}

impl SymbolKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Namespace => "namespace",
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Interface => "interface",
            Self::Trait => "trait",
            Self::Function => "function",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Field => "field",
            Self::Property => "property",
            Self::Variable => "variable",
            Self::Constant => "constant",
            Self::TypeAlias => "type_alias",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SymbolKind {
    type Error = ParseSymbolKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "module" => Ok(Self::Module),
            "namespace" => Ok(Self::Namespace),
            "class" => Ok(Self::Class),
            "struct" => Ok(Self::Struct),
            "enum" => Ok(Self::Enum),
            "interface" => Ok(Self::Interface),
            "trait" => Ok(Self::Trait),
            "function" => Ok(Self::Function),
            "method" => Ok(Self::Method),
            "constructor" => Ok(Self::Constructor),
            "field" => Ok(Self::Field),
            "property" => Ok(Self::Property),
            "variable" => Ok(Self::Variable),
            "constant" => Ok(Self::Constant),
            "type_alias" => Ok(Self::TypeAlias),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ParseSymbolKindError(value.to_owned())),
        }
    }
}

/// A named code entity with ordered children.
///
/// Children keep source-file appearance order through every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSymbolNode")]
pub struct SymbolNode {
    name: String,
    kind: SymbolKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<SymbolNode>,
}

/// Decoded node before the name is validated.
#[derive(Deserialize)]
struct RawSymbolNode {
    name: String,
    kind: SymbolKind,
    #[serde(default)]
    children: Vec<SymbolNode>,
}

impl TryFrom<RawSymbolNode> for SymbolNode {
    type Error = SymbolCacheDomainError;

    fn try_from(raw: RawSymbolNode) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.name, raw.kind)?.with_children(raw.children))
    }
}

impl SymbolNode {
    /// Creates a leaf symbol.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolCacheDomainError::EmptySymbolName`] when `name` is
    /// empty after trimming.
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Result<Self, SymbolCacheDomainError> {
        let normalized = name.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(SymbolCacheDomainError::EmptySymbolName);
        }
        Ok(Self {
            name: normalized,
            kind,
            children: Vec::new(),
        })
    }

    /// Replaces the children, keeping the given order.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    /// Returns the symbol name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the symbol kind.
    #[must_use]
    pub const fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Returns the children in document order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Counts this node and every descendant.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + count_nodes(&self.children)
    }
}

/// Counts every node in a forest.
#[must_use]
pub fn count_nodes(nodes: &[SymbolNode]) -> usize {
    nodes.iter().map(SymbolNode::node_count).sum()
}

/// Adds the kind of every node in `nodes` to `histogram`.
pub fn tally_kinds(nodes: &[SymbolNode], histogram: &mut BTreeMap<SymbolKind, usize>) {
    for node in nodes {
        *histogram.entry(node.kind).or_default() += 1;
        tally_kinds(&node.children, histogram);
    }
}
