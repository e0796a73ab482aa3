//! Core domain types and utilities for the cofounder platform.
//!
//! This crate provides the identifiers and error handling foundation shared
//! by the workflow engine and the server.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{FounderId, ParseIdError, TaskId, WorkflowExecutionId, WorkspaceId};
