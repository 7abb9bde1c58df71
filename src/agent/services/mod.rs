//! Agent orchestration services.

mod commands;
mod error;
mod executor;
mod indexer;

pub use commands::CommandService;
pub use error::{AgentError, AgentResult};
pub use executor::TaskExecutor;
pub use indexer::SymbolIndexService;
