//! Error types for the workflow crate.
//!
//! Errors are plain enums with hand-written `Display` impls, one per layer:
//! - `GraphError`: graph validation failures
//! - `ExecutorError`: run-level fatal failures that abort a workflow run
//!
//! Collaborator errors (`RoutingError`, `StoreError`) live next to the traits
//! that return them and travel wrapped in a rootcause `Report`.

use crate::agent::AgentType;
use cofounder_core::TaskId;
use std::fmt;

/// Errors from graph validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The graph declares no nodes.
    NoNodes,
    /// Two nodes declare the same agent type.
    DuplicateNode { agent_type: AgentType },
    /// An edge references an agent type no node declares.
    DanglingEdge {
        from: AgentType,
        to: AgentType,
        missing: AgentType,
    },
    /// The edges form a cycle. `path` starts and ends on the same agent.
    CycleDetected { path: Vec<AgentType> },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoNodes => write!(f, "workflow graph has no nodes"),
            Self::DuplicateNode { agent_type } => {
                write!(f, "duplicate node for agent type {agent_type}")
            }
            Self::DanglingEdge { from, to, missing } => {
                write!(f, "edge {from} -> {to} references undeclared node {missing}")
            }
            Self::CycleDetected { path } => {
                let path = path
                    .iter()
                    .map(AgentType::as_str)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                write!(f, "cycle detected: {path}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Run-level failures that abort a workflow run.
///
/// Node failures are not errors at this level: they are recorded as failed
/// steps and short-circuit the remaining nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// A dispatched task did not reach a terminal status in time.
    StepTimeout {
        agent_type: AgentType,
        task_id: TaskId,
        timeout_secs: u64,
    },
    /// The whole run exceeded its deadline.
    RunTimeout { timeout_secs: u64 },
    /// Polling the routing service for a task failed.
    Polling {
        agent_type: AgentType,
        task_id: TaskId,
        message: String,
    },
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StepTimeout {
                agent_type,
                task_id,
                timeout_secs,
            } => {
                write!(
                    f,
                    "agent {agent_type} timeout: task {task_id} not finished after {timeout_secs}s"
                )
            }
            Self::RunTimeout { timeout_secs } => {
                write!(f, "workflow timeout: run exceeded {timeout_secs}s")
            }
            Self::Polling {
                agent_type,
                task_id,
                message,
            } => {
                write!(f, "polling task {task_id} for agent {agent_type} failed: {message}")
            }
        }
    }
}

impl std::error::Error for ExecutorError {}
