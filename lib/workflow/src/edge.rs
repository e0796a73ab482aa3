//! Edge types for workflow graphs.
//!
//! Edges connect agent types. Each edge specifies:
//! - The upstream agent (`from`) that must complete first
//! - The downstream agent (`to`) that consumes its output
//! - An advisory data mapping from upstream output keys to downstream input keys
//!
//! The engine never enforces the data mapping; downstream agents receive every
//! upstream output under `previousOutputs` and use the mapping as documentation.

use crate::agent::AgentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dependency between two agents in a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    /// The upstream agent.
    pub from: AgentType,
    /// The downstream agent.
    pub to: AgentType,
    /// Upstream output key -> downstream input key.
    #[serde(default)]
    pub data_mapping: BTreeMap<String, String>,
}

impl WorkflowEdge {
    /// Creates a new edge with an empty data mapping.
    #[must_use]
    pub fn new(from: AgentType, to: AgentType) -> Self {
        Self {
            from,
            to,
            data_mapping: BTreeMap::new(),
        }
    }

    /// Documents that `output_key` of the upstream agent feeds `input_key` downstream.
    #[must_use]
    pub fn with_mapping(mut self, output_key: impl Into<String>, input_key: impl Into<String>) -> Self {
        self.data_mapping.insert(output_key.into(), input_key.into());
        self
    }
}
