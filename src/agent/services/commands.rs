//! Command dispatch over the indexer and the plan service.

use super::{AgentResult, SymbolIndexService};
use crate::agent::domain::{Command, CommandOutput, TaskListing};
use crate::store::DurableStore;
use crate::symbol_cache::{
    domain::{FileKey, SearchOptions},
    ports::SourceReader,
};
use crate::task::{ports::TaskSnapshotRepository, services::TaskPlanService};
use crate::tool_registry::ports::ToolEndpoint;
use mockable::Clock;
use tracing::debug;

/// Executes [`Command`]s and returns their outputs.
pub struct CommandService<S, R, E, P, C>
where
    S: DurableStore,
    R: SourceReader,
    E: ToolEndpoint,
    P: TaskSnapshotRepository,
    C: Clock + Send + Sync,
{
    indexer: SymbolIndexService<S, R, E, C>,
    plans: TaskPlanService<P, C>,
}

impl<S, R, E, P, C> CommandService<S, R, E, P, C>
where
    S: DurableStore,
    R: SourceReader,
    E: ToolEndpoint,
    P: TaskSnapshotRepository,
    C: Clock + Send + Sync,
{
    /// Creates a command service.
    #[must_use]
    pub const fn new(indexer: SymbolIndexService<S, R, E, C>, plans: TaskPlanService<P, C>) -> Self {
        Self { indexer, plans }
    }

    /// Runs `command`.
    ///
    /// # Errors
    ///
    /// Returns [`super::AgentError`] when a path is invalid or the cache or
    /// plan service fails. Per-file indexing failures are reported in the
    /// output instead.
    pub async fn execute(&self, command: Command) -> AgentResult<CommandOutput> {
        debug!(command = command.name(), "executing command");
        match command {
            Command::ShowCacheStats => Ok(CommandOutput::CacheStats(
                self.indexer.cache().stats().await?,
            )),
            Command::SearchSymbols {
                query,
                options,
                limit,
            } => self.search(&query, options, limit).await,
            Command::IndexFiles { paths } => {
                let keys = parse_keys(paths)?;
                Ok(CommandOutput::Indexed(self.indexer.index_files(&keys).await))
            }
            Command::Invalidate { paths } => {
                let files = parse_keys(paths)?;
                for file in &files {
                    self.indexer.cache().invalidate(file).await?;
                }
                Ok(CommandOutput::Invalidated { files })
            }
            Command::ClearCache => {
                self.indexer.cache().clear().await?;
                Ok(CommandOutput::CacheCleared)
            }
            Command::ShowTasks => {
                let graph = self.plans.snapshot().await;
                Ok(CommandOutput::Tasks(TaskListing {
                    plan: graph.plan().cloned(),
                    tasks: graph.tasks().to_vec(),
                    progress: graph.progress(),
                }))
            }
            Command::ResetTasks => {
                self.plans.reset().await?;
                Ok(CommandOutput::TasksReset)
            }
        }
    }

    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
        limit: Option<usize>,
    ) -> AgentResult<CommandOutput> {
        let search = self.indexer.cache().search(query, options).await?;
        let output = match limit {
            Some(limit) => {
                let mut matches: Vec<_> = search.iter().take(limit.saturating_add(1)).collect();
                let truncated = matches.len() > limit;
                matches.truncate(limit);
                CommandOutput::SymbolMatches { matches, truncated }
            }
            None => CommandOutput::SymbolMatches {
                matches: search.iter().collect(),
                truncated: false,
            },
        };
        Ok(output)
    }
}

fn parse_keys(paths: Vec<String>) -> AgentResult<Vec<FileKey>> {
    paths
        .into_iter()
        .map(|path| FileKey::new(path).map_err(Into::into))
        .collect()
}
