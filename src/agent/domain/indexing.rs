//! Indexing settings and per-file outcomes.

use crate::symbol_cache::domain::FileKey;
use crate::tool_registry::domain::EndpointName;
use serde::{Deserialize, Serialize};

/// Operation asked for a file's symbol tree unless configured otherwise.
pub const DEFAULT_SYMBOL_OPERATION: &str = "document_symbols";

/// Argument carrying the file path unless configured otherwise.
pub const DEFAULT_PATH_ARGUMENT: &str = "path";

/// Where and how the indexer fetches symbol trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerSettings {
    endpoint: EndpointName,
    operation: String,
    path_argument: String,
}

impl IndexerSettings {
    /// Creates settings that call [`DEFAULT_SYMBOL_OPERATION`] on `endpoint`.
    #[must_use]
    pub fn new(endpoint: EndpointName) -> Self {
        Self {
            endpoint,
            operation: DEFAULT_SYMBOL_OPERATION.to_owned(),
            path_argument: DEFAULT_PATH_ARGUMENT.to_owned(),
        }
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Sets the name of the path argument.
    #[must_use]
    pub fn with_path_argument(mut self, path_argument: impl Into<String>) -> Self {
        self.path_argument = path_argument.into();
        self
    }

    /// Returns the endpoint symbols are fetched from.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointName {
        &self.endpoint
    }

    /// Returns the operation name.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns the name of the path argument.
    #[must_use]
    pub fn path_argument(&self) -> &str {
        &self.path_argument
    }
}

/// What happened to one file during indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IndexOutcome {
    /// The cached tree still matches the file.
    Cached {
        /// File served.
        file: FileKey,
        /// Symbols in the tree.
        nodes: usize,
    },
    /// The tree was fetched and cached.
    Indexed {
        /// File indexed.
        file: FileKey,
        /// Symbols in the tree.
        nodes: usize,
    },
    /// The tree was fetched but the file could not be fingerprinted, so it
    /// was not cached.
    Uncached {
        /// File indexed.
        file: FileKey,
        /// Symbols in the tree.
        nodes: usize,
        /// Why the file could not be fingerprinted.
        reason: String,
    },
    /// The file changed while its tree was being fetched, so the tree was
    /// discarded.
    Changed {
        /// File affected.
        file: FileKey,
    },
    /// Fetching or caching failed.
    Failed {
        /// File affected.
        file: FileKey,
        /// Failure message.
        error: String,
    },
}

impl IndexOutcome {
    /// Returns the file the outcome is about.
    #[must_use]
    pub const fn file(&self) -> &FileKey {
        match self {
            Self::Cached { file, .. }
            | Self::Indexed { file, .. }
            | Self::Uncached { file, .. }
            | Self::Changed { file }
            | Self::Failed { file, .. } => file,
        }
    }

    /// Returns `true` if the symbols were served from the cache.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self, Self::Cached { .. })
    }
}

/// Outcomes of a batch, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    /// Per-file outcomes.
    pub outcomes: Vec<IndexOutcome>,
}

impl IndexReport {
    /// Returns how many files were served from the cache.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.count(|outcome| matches!(outcome, IndexOutcome::Cached { .. }))
    }

    /// Returns how many files were fetched and cached.
    #[must_use]
    pub fn indexed(&self) -> usize {
        self.count(|outcome| matches!(outcome, IndexOutcome::Indexed { .. }))
    }

    /// Returns how many files failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, IndexOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&IndexOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|outcome| predicate(outcome)).count()
    }
}
