//! State that survives a restart over the same durable store.

use super::helpers::{Substrate, struct_tree, symbol_endpoint};
use armature::{
    agent::domain::IndexOutcome,
    task::domain::{PlannedTask, TaskId, TaskStatus, TransitionPayload},
    tool_registry::adapters::ScriptedResponse,
};
use eyre::{ensure, eyre};
use rstest::rstest;
use serde_json::json;

const SYMBOLS: &str = "document_symbols";

#[rstest]
#[tokio::test]
async fn cached_symbols_are_served_after_restart_without_refetching() -> eyre::Result<()> {
    let first = Substrate::fresh().await?;
    let key = first.write_source("src/lexer.rs", "struct Lexer;")?;
    first.endpoint.script(
        &symbol_endpoint(),
        SYMBOLS,
        [ScriptedResponse::Reply(struct_tree("Lexer", &["new"]))],
    );
    first.indexer.index_file(&key).await?;

    let second = first.restart().await?;
    let outcome = second.indexer.index_file(&key).await?;

    ensure!(
        outcome
            == IndexOutcome::Cached {
                file: key.clone(),
                nodes: 2
            }
    );
    ensure!(second.endpoint.invoke_count(&symbol_endpoint()) == 1);
    ensure!(second.indexer.cache().stats().await?.file_count() == 1);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn entry_for_a_file_edited_while_stopped_is_refetched() -> eyre::Result<()> {
    let first = Substrate::fresh().await?;
    let key = first.write_source("src/lexer.rs", "struct Lexer;")?;
    first.endpoint.script(
        &symbol_endpoint(),
        SYMBOLS,
        [
            ScriptedResponse::Reply(struct_tree("Lexer", &["new"])),
            ScriptedResponse::Reply(struct_tree("Lexer", &["new", "peek"])),
        ],
    );
    first.indexer.index_file(&key).await?;
    first.write_source("src/lexer.rs", "struct Lexer { pos: usize }")?;

    let second = first.restart().await?;
    let outcome = second.indexer.index_file(&key).await?;

    ensure!(
        outcome
            == IndexOutcome::Indexed {
                file: key.clone(),
                nodes: 3
            }
    );
    ensure!(second.endpoint.invoke_count(&symbol_endpoint()) == 2);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn task_graph_is_restored_with_statuses_and_results() -> eyre::Result<()> {
    let first = Substrate::fresh().await?;
    first
        .plans
        .create_plan(
            "rename module",
            vec![
                PlannedTask::new("find usages"),
                PlannedTask::new("rewrite imports").after([0]),
            ],
        )
        .await?;
    let find = TaskId::new(1);
    first
        .plans
        .transition(find, TaskStatus::Running, TransitionPayload::none())
        .await?;
    first
        .plans
        .transition(
            find,
            TaskStatus::Completed,
            TransitionPayload::result(json!({"usages": 4})),
        )
        .await?;

    let second = first.restart().await?;

    let restored = second
        .plans
        .task(find)
        .await
        .ok_or_else(|| eyre!("task should be restored"))?;
    ensure!(restored.status() == TaskStatus::Completed);
    ensure!(restored.result() == Some(&json!({"usages": 4})));

    let next = second
        .plans
        .next_runnable()
        .await
        .ok_or_else(|| eyre!("dependent task should be runnable"))?;
    ensure!(next.name() == "rewrite imports");
    ensure!(second.plans.progress().await.completed == 1);

    let added = second
        .plans
        .add_task(armature::task::domain::TaskSpec::new("run tests"))
        .await?;
    ensure!(added.id() == TaskId::new(3), "identifiers continue after restore");
    Ok(())
}
