//! Indexing through the resilient invoker against a flaky endpoint.

use super::helpers::{Substrate, struct_tree, symbol_endpoint};
use armature::{
    agent::domain::IndexOutcome,
    tool_registry::{
        adapters::{ScriptEvent, ScriptedResponse},
        domain::ConnectionStatus,
        ports::EndpointError,
    },
};
use eyre::ensure;
use rstest::rstest;

const SYMBOLS: &str = "document_symbols";

#[rstest]
#[tokio::test(start_paused = true)]
async fn dropped_session_is_replaced_before_the_fetch_is_retried() -> eyre::Result<()> {
    let substrate = Substrate::fresh().await?;
    let key = substrate.write_source("src/lexer.rs", "struct Lexer;")?;
    substrate.endpoint.script(
        &symbol_endpoint(),
        SYMBOLS,
        [
            ScriptedResponse::Fail(EndpointError::ConnectionReset("bridge restarted".to_owned())),
            ScriptedResponse::Reply(struct_tree("Lexer", &["next_token"])),
        ],
    );

    let outcome = substrate.indexer.index_file(&key).await?;

    ensure!(
        outcome
            == IndexOutcome::Indexed {
                file: key.clone(),
                nodes: 2
            }
    );
    let sessions: Vec<u64> = substrate
        .endpoint
        .events()
        .into_iter()
        .filter_map(|event| match event {
            ScriptEvent::Invoked { session, .. } => Some(session),
            _ => None,
        })
        .collect();
    ensure!(sessions == vec![1, 2], "retry should run on a fresh session");

    let states = substrate.invoker.registry().states().await;
    let Some((_, state)) = states.first() else {
        eyre::bail!("expected one endpoint state");
    };
    ensure!(state.status == ConnectionStatus::Connected);
    ensure!(state.reconnect_count == 1);
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn rejected_fetch_is_reported_without_caching() -> eyre::Result<()> {
    let substrate = Substrate::fresh().await?;
    let key = substrate.write_source("src/broken.rs", "fn (")?;
    substrate.endpoint.script(
        &symbol_endpoint(),
        SYMBOLS,
        [ScriptedResponse::Fail(EndpointError::Remote(
            "parse error".to_owned(),
        ))],
    );

    let report = substrate.indexer.index_files(&[key]).await;

    ensure!(report.failed() == 1);
    ensure!(substrate.endpoint.invoke_count(&symbol_endpoint()) == 1);
    ensure!(substrate.indexer.cache().stats().await?.file_count() == 0);
    ensure!(substrate.store.is_empty()?);
    Ok(())
}
