//! Workflow node types.
//!
//! A node binds an agent type into a workflow graph together with a short
//! description of what that agent contributes to the pipeline. Nodes are
//! immutable once the graph holding them has been registered.

use crate::agent::AgentType;
use serde::{Deserialize, Serialize};

/// A single step of a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Human-readable node id (unique within a graph by convention).
    pub id: String,
    /// The agent this node dispatches to; also the node's identity in edges.
    pub agent_type: AgentType,
    /// What this step contributes to the workflow.
    pub description: String,
}

impl WorkflowNode {
    /// Creates a new node.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        agent_type: AgentType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            agent_type,
            description: description.into(),
        }
    }
}
