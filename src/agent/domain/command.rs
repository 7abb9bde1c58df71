//! Command surface and its serialisable outputs.

use super::IndexReport;
use crate::symbol_cache::domain::{CacheStats, FileKey, SearchOptions, SymbolMatch};
use crate::task::domain::{Plan, Progress, Task};
use serde::{Deserialize, Serialize};

/// A request to the agent services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Report cache counters.
    ShowCacheStats,
    /// Search cached symbols.
    SearchSymbols {
        /// Name or name fragment to look for.
        query: String,
        /// Kind filter and exact matching.
        #[serde(default)]
        options: SearchOptions,
        /// Maximum number of matches to return.
        #[serde(default)]
        limit: Option<usize>,
    },
    /// Index the files, fetching any that are not cached.
    IndexFiles {
        /// Workspace-relative paths.
        paths: Vec<String>,
    },
    /// Drop cached entries for the files.
    Invalidate {
        /// Workspace-relative paths.
        paths: Vec<String>,
    },
    /// Drop every cached entry.
    ClearCache,
    /// Report the plan, its tasks and progress.
    ShowTasks,
    /// Remove the plan and every task.
    ResetTasks,
}

impl Command {
    /// Returns the command name as typed by users.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ShowCacheStats => "show-cache-stats",
            Self::SearchSymbols { .. } => "search-symbols",
            Self::IndexFiles { .. } => "index-files",
            Self::Invalidate { .. } => "invalidate",
            Self::ClearCache => "clear-cache",
            Self::ShowTasks => "show-tasks",
            Self::ResetTasks => "reset-tasks",
        }
    }
}

/// The current plan with its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListing {
    /// Active plan, if one was created.
    pub plan: Option<Plan>,
    /// Tasks in insertion order.
    pub tasks: Vec<Task>,
    /// Aggregate counts.
    pub progress: Progress,
}

/// Result of a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "output", rename_all = "snake_case")]
pub enum CommandOutput {
    /// Cache counters.
    CacheStats(CacheStats),
    /// Search hits in file order.
    SymbolMatches {
        /// Matches returned.
        matches: Vec<SymbolMatch>,
        /// `true` when more matches exist beyond the limit.
        truncated: bool,
    },
    /// Per-file indexing outcomes.
    Indexed(IndexReport),
    /// Files whose entries were dropped.
    Invalidated {
        /// Normalised keys.
        files: Vec<FileKey>,
    },
    /// Every cached entry was dropped.
    CacheCleared,
    /// Plan and task listing.
    Tasks(TaskListing),
    /// The plan and tasks were removed.
    TasksReset,
}
