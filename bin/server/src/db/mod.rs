//! Database repositories for the cofounder server.
//!
//! This module provides data access for finished workflow executions.

pub mod workflow_execution;

pub use workflow_execution::PgExecutionStore;
