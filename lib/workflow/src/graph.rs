//! Workflow graph model.
//!
//! Workflows are directed graphs where:
//! - Nodes are agent steps, identified by their agent type
//! - Edges are dependencies between agent types
//!
//! Graphs are plain declaration-ordered lists. Declaration order matters: it
//! breaks ties in the execution order and fixes the traversal order of cycle
//! detection, so two runs over the same graph always visit nodes identically.

use crate::agent::AgentType;
use crate::edge::WorkflowEdge;
use crate::error::GraphError;
use crate::node::WorkflowNode;
use crate::schedule;
use crate::validate;
use serde::{Deserialize, Serialize};

/// A workflow DAG template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    /// Nodes in declaration order.
    pub nodes: Vec<WorkflowNode>,
    /// Edges in declaration order.
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
}

impl WorkflowGraph {
    /// Creates a new empty workflow graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph holding exactly one node.
    #[must_use]
    pub fn single(node: WorkflowNode) -> Self {
        Self::new().with_node(node)
    }

    /// Adds a node.
    #[must_use]
    pub fn with_node(mut self, node: WorkflowNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Adds an edge. Endpoints are checked by [`WorkflowGraph::validate`], not here.
    #[must_use]
    pub fn with_edge(mut self, edge: WorkflowEdge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Returns the node declared for an agent type.
    #[must_use]
    pub fn node(&self, agent_type: AgentType) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|node| node.agent_type == agent_type)
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the agent types this agent feeds, in edge declaration order.
    pub fn successors(&self, agent_type: AgentType) -> impl Iterator<Item = AgentType> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.from == agent_type)
            .map(|edge| edge.to)
    }

    /// Returns nodes that have no incoming edges (entry points).
    pub fn entry_nodes(&self) -> Vec<&WorkflowNode> {
        self.nodes
            .iter()
            .filter(|node| !self.edges.iter().any(|edge| edge.to == node.agent_type))
            .collect()
    }

    /// Validates the workflow graph.
    ///
    /// Checks:
    /// - At least one node, and no agent type declared twice
    /// - Every edge endpoint is a declared node
    /// - No cycles (DAG validation)
    ///
    /// # Errors
    ///
    /// Returns an error describing the first validation failure.
    pub fn validate(&self) -> Result<(), GraphError> {
        validate::validate(self)
    }

    /// Returns the nodes in execution order.
    ///
    /// The graph must already be valid; see [`schedule::topological_order`].
    #[must_use]
    pub fn execution_order(&self) -> Vec<&WorkflowNode> {
        schedule::topological_order(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn briefing_pipeline() -> WorkflowGraph {
        WorkflowGraph::new()
            .with_node(WorkflowNode::new("brief", AgentType::BriefingGenerator, "brief"))
            .with_node(WorkflowNode::new("tasks", AgentType::TaskManager, "tasks"))
            .with_node(WorkflowNode::new("recs", AgentType::RecommendationEngine, "recs"))
            .with_edge(WorkflowEdge::new(AgentType::BriefingGenerator, AgentType::TaskManager))
            .with_edge(WorkflowEdge::new(AgentType::TaskManager, AgentType::RecommendationEngine))
    }

    #[test]
    fn lookup_node_by_agent_type() {
        let graph = briefing_pipeline();
        let node = graph.node(AgentType::TaskManager).expect("node present");
        assert_eq!(node.id, "tasks");
        assert!(graph.node(AgentType::KpiAnalyzer).is_none());
    }

    #[test]
    fn entry_nodes_returns_nodes_without_incoming() {
        let graph = briefing_pipeline();
        let entries = graph.entry_nodes();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].agent_type, AgentType::BriefingGenerator);
    }

    #[test]
    fn successors_follow_edge_order() {
        let graph = briefing_pipeline();
        let next: Vec<_> = graph.successors(AgentType::BriefingGenerator).collect();
        assert_eq!(next, vec![AgentType::TaskManager]);
    }

    #[test]
    fn graph_deserializes_without_edges() {
        let graph: WorkflowGraph = serde_json::from_str(
            r#"{"nodes":[{"id":"a","agent_type":"market_research","description":"scan"}]}"#,
        )
        .expect("deserialize");
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.validate().is_ok());
    }
}
