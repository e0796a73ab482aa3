//! cofounder workflow server.
//!
//! This crate wires the workflow engine to its production collaborators:
//! the agent routing service over HTTP and PostgreSQL for execution records,
//! and exposes orchestration through a small JSON API.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod routing;
