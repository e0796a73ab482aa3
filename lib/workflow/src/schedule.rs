//! Topological scheduling for validated workflow graphs.

use crate::agent::AgentType;
use crate::graph::WorkflowGraph;
use crate::node::WorkflowNode;
use std::collections::{HashMap, VecDeque};

/// Linearizes a validated graph with Kahn's algorithm.
///
/// The queue is FIFO and seeded with zero in-degree nodes in declaration
/// order; a node's outgoing edges are relaxed in edge declaration order. The
/// result is therefore fully determined by the graph's declaration order.
///
/// Callers must run [`WorkflowGraph::validate`] first. On a graph containing a
/// cycle the nodes on the cycle are simply left out of the result.
#[must_use]
pub fn topological_order(graph: &WorkflowGraph) -> Vec<&WorkflowNode> {
    let mut in_degree: HashMap<AgentType, usize> = graph
        .nodes
        .iter()
        .map(|node| (node.agent_type, 0))
        .collect();
    for edge in &graph.edges {
        if let Some(degree) = in_degree.get_mut(&edge.to) {
            *degree += 1;
        }
    }

    let mut queue: VecDeque<&WorkflowNode> = graph.entry_nodes().into_iter().collect();
    let mut order = Vec::with_capacity(graph.nodes.len());

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for successor in graph.successors(node.agent_type) {
            let Some(degree) = in_degree.get_mut(&successor) else {
                continue;
            };
            *degree = degree.saturating_sub(1);
            if *degree == 0
                && let Some(next) = graph.node(successor)
            {
                queue.push_back(next);
            }
        }
    }

    order
}
