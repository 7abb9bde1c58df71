//! Armature: execution substrate for coding agents.
//!
//! The crate keeps an agent's view of a codebase current and its work in
//! order:
//!
//! - [`symbol_cache`]: content-addressed symbol trees that are never served
//!   against edited files
//! - [`task`]: a dependency-gated task graph with a validated state machine
//! - [`tool_registry`]: remote tool endpoints behind a retrying, reconnecting
//!   invoker
//! - [`agent`]: the indexer, executor and command service built on the three
//! - [`store`]: the durable key/value port everything writes through to
//!
//! # Architecture
//!
//! Each module follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, filesystem)
//! - **Services**: Orchestration over ports
//!
//! [`config`] loads layered settings and [`telemetry`] installs the tracing
//! subscriber.

pub mod agent;
pub mod config;
pub mod store;
pub mod symbol_cache;
pub mod task;
pub mod telemetry;
pub mod tool_registry;
