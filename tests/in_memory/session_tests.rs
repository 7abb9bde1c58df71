//! A plan whose tasks index files, driven to completion and then queried.

use std::sync::Arc;

use super::helpers::{Substrate, TestIndexer, struct_tree, symbol_endpoint};
use armature::{
    agent::{
        domain::{Command, CommandOutput, StallPolicy},
        ports::{HandlerError, TaskHandler},
        services::TaskExecutor,
    },
    symbol_cache::domain::{FileKey, SearchOptions, SymbolKind},
    task::domain::{PlanStatus, PlannedTask, Task, TaskStatus},
    tool_registry::{adapters::ScriptedResponse, ports::EndpointError},
};
use async_trait::async_trait;
use eyre::{bail, ensure};
use rstest::rstest;
use serde_json::Value;

const SYMBOLS: &str = "document_symbols";

/// Indexes the file named in the task description.
struct IndexingHandler {
    indexer: TestIndexer,
}

#[async_trait]
impl TaskHandler for IndexingHandler {
    async fn execute(&self, task: &Task) -> Result<Value, HandlerError> {
        let Some(path) = task.description() else {
            return Ok(Value::Null);
        };
        let key = FileKey::new(path).map_err(|err| HandlerError::Failed(err.to_string()))?;
        let outcome = self
            .indexer
            .index_file(&key)
            .await
            .map_err(|err| HandlerError::Failed(err.to_string()))?;
        serde_json::to_value(outcome).map_err(|err| HandlerError::Failed(err.to_string()))
    }
}

fn indexing_plan() -> Vec<PlannedTask> {
    vec![
        PlannedTask::new("index lexer").with_description("src/lexer.rs"),
        PlannedTask::new("index parser").with_description("src/parser.rs"),
        PlannedTask::new("summarise").after([0, 1]),
    ]
}

#[rstest]
#[tokio::test]
async fn indexing_plan_runs_to_completion_and_is_searchable() -> eyre::Result<()> {
    let substrate = Substrate::fresh().await?;
    substrate.write_source("src/lexer.rs", "struct Lexer;")?;
    substrate.write_source("src/parser.rs", "struct Parser;")?;
    substrate.endpoint.script(
        &symbol_endpoint(),
        SYMBOLS,
        [
            ScriptedResponse::Reply(struct_tree("Lexer", &["new", "next_token"])),
            ScriptedResponse::Reply(struct_tree("Parser", &["new", "parse_expr"])),
        ],
    );
    substrate
        .plans
        .create_plan("map the front end", indexing_plan())
        .await?;
    let handler = Arc::new(IndexingHandler {
        indexer: substrate.indexer.clone(),
    });
    let executor = TaskExecutor::new(substrate.plans.clone(), handler);

    let report = executor.run_to_completion().await?;

    ensure!(report.completed.len() == 3);
    ensure!(report.failed.is_empty());
    ensure!(report.progress.percent_complete == 100);

    let commands = substrate.commands();
    let output = commands
        .execute(Command::SearchSymbols {
            query: "parse".to_owned(),
            options: SearchOptions::default().with_kind(SymbolKind::Method),
            limit: None,
        })
        .await?;
    let CommandOutput::SymbolMatches { matches, truncated } = output else {
        bail!("expected symbol matches");
    };
    ensure!(!truncated);
    ensure!(
        matches
            .iter()
            .map(|hit| hit.qualified_path.as_str())
            .collect::<Vec<_>>()
            == vec!["Parser/parse_expr"]
    );

    let CommandOutput::Tasks(listing) = commands.execute(Command::ShowTasks).await? else {
        bail!("expected a task listing");
    };
    ensure!(listing.plan.map(|plan| plan.status()) == Some(PlanStatus::Completed));
    ensure!(
        listing
            .tasks
            .iter()
            .all(|task| task.status() == TaskStatus::Completed)
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn failed_index_skips_the_summary_under_skip_policy() -> eyre::Result<()> {
    let substrate = Substrate::fresh().await?;
    substrate.write_source("src/lexer.rs", "struct Lexer;")?;
    substrate.write_source("src/parser.rs", "struct Parser;")?;
    substrate.endpoint.script(
        &symbol_endpoint(),
        SYMBOLS,
        [
            ScriptedResponse::Reply(struct_tree("Lexer", &["new"])),
            ScriptedResponse::Fail(EndpointError::InvalidArguments(
                "unsupported language".to_owned(),
            )),
        ],
    );
    substrate
        .plans
        .create_plan("map the front end", indexing_plan())
        .await?;
    let handler = Arc::new(IndexingHandler {
        indexer: substrate.indexer.clone(),
    });
    let executor = TaskExecutor::new(substrate.plans.clone(), handler)
        .with_stall_policy(StallPolicy::SkipBlocked);

    let report = executor.run_to_completion().await?;

    ensure!(report.completed.len() == 1);
    ensure!(report.failed.len() == 1);
    ensure!(report.skipped.len() == 1);
    ensure!(substrate.plans.is_complete().await);

    let CommandOutput::CacheStats(stats) = substrate
        .commands()
        .execute(Command::ShowCacheStats)
        .await?
    else {
        bail!("expected cache stats");
    };
    ensure!(stats.file_count() == 1);
    Ok(())
}
