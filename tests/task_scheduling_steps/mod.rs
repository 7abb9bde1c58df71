//! Step definitions for task scheduling scenarios.

mod given;
mod then;
mod when;
pub mod world;
