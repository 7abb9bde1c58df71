//! Unit tests for the task module.

mod graph_tests;
