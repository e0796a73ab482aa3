//! DAG validation for workflow graphs.
//!
//! Cycle detection is a three-color depth-first search: `visited` holds every
//! agent already reached, `on_path` holds the agents on the current DFS path.
//! Reaching an agent that is still on the path closes a cycle. The walk keeps
//! its own frame stack instead of recursing, so graph depth is bounded only by
//! memory.

use crate::agent::AgentType;
use crate::error::GraphError;
use crate::graph::WorkflowGraph;
use std::collections::{HashMap, HashSet};

/// Validates that `graph` is a non-empty DAG whose edges reference declared nodes.
///
/// Top-level DFS roots are taken in node declaration order; which cycle is
/// reported first depends on that order, but any cycle is always found.
///
/// # Errors
///
/// - [`GraphError::NoNodes`] when the graph is empty
/// - [`GraphError::DuplicateNode`] when an agent type is declared twice
/// - [`GraphError::DanglingEdge`] when an edge endpoint is not a declared node
/// - [`GraphError::CycleDetected`] when the edges form a cycle
pub fn validate(graph: &WorkflowGraph) -> Result<(), GraphError> {
    if graph.nodes.is_empty() {
        return Err(GraphError::NoNodes);
    }

    let mut adjacency: HashMap<AgentType, Vec<AgentType>> = HashMap::new();
    for node in &graph.nodes {
        if adjacency.insert(node.agent_type, Vec::new()).is_some() {
            return Err(GraphError::DuplicateNode {
                agent_type: node.agent_type,
            });
        }
    }

    for edge in &graph.edges {
        for endpoint in [edge.from, edge.to] {
            if !adjacency.contains_key(&endpoint) {
                return Err(GraphError::DanglingEdge {
                    from: edge.from,
                    to: edge.to,
                    missing: endpoint,
                });
            }
        }
        if let Some(neighbors) = adjacency.get_mut(&edge.from) {
            neighbors.push(edge.to);
        }
    }

    let mut visited = HashSet::new();
    for node in &graph.nodes {
        if !visited.contains(&node.agent_type) {
            find_cycle_from(node.agent_type, &adjacency, &mut visited)?;
        }
    }

    Ok(())
}

/// Walks everything reachable from `root`, failing on the first back edge.
fn find_cycle_from(
    root: AgentType,
    adjacency: &HashMap<AgentType, Vec<AgentType>>,
    visited: &mut HashSet<AgentType>,
) -> Result<(), GraphError> {
    // Each frame is (agent, index of the next outgoing edge to explore).
    let mut stack: Vec<(AgentType, usize)> = vec![(root, 0)];
    let mut on_path: HashSet<AgentType> = HashSet::from([root]);
    visited.insert(root);

    while let Some(frame) = stack.last_mut() {
        let current = frame.0;
        let next = adjacency
            .get(&current)
            .and_then(|neighbors| neighbors.get(frame.1))
            .copied();

        let Some(neighbor) = next else {
            on_path.remove(&current);
            stack.pop();
            continue;
        };
        frame.1 += 1;

        if on_path.contains(&neighbor) {
            let start = stack
                .iter()
                .position(|(agent, _)| *agent == neighbor)
                .unwrap_or(0);
            let mut path: Vec<AgentType> = stack[start..].iter().map(|(agent, _)| *agent).collect();
            path.push(neighbor);
            return Err(GraphError::CycleDetected { path });
        }

        if visited.insert(neighbor) {
            on_path.insert(neighbor);
            stack.push((neighbor, 0));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::WorkflowEdge;
    use crate::node::WorkflowNode;
    use petgraph::graph::DiGraph;

    fn node(agent_type: AgentType) -> WorkflowNode {
        WorkflowNode::new(agent_type.as_str(), agent_type, "test node")
    }

    fn graph_of(agents: &[AgentType], edges: &[(AgentType, AgentType)]) -> WorkflowGraph {
        let graph = agents
            .iter()
            .fold(WorkflowGraph::new(), |graph, agent| graph.with_node(node(*agent)));
        edges.iter().fold(graph, |graph, (from, to)| {
            graph.with_edge(WorkflowEdge::new(*from, *to))
        })
    }

    #[test]
    fn empty_graph_is_rejected() {
        let err = validate(&WorkflowGraph::new()).unwrap_err();
        assert_eq!(err, GraphError::NoNodes);
        assert!(err.to_string().contains("node"));
    }

    #[test]
    fn two_node_cycle_is_rejected() {
        use AgentType::*;
        let graph = graph_of(
            &[TaskManager, BriefingGenerator],
            &[(TaskManager, BriefingGenerator), (BriefingGenerator, TaskManager)],
        );
        let err = validate(&graph).unwrap_err();
        assert!(err.to_string().contains("cycle"));
        assert_eq!(
            err,
            GraphError::CycleDetected {
                path: vec![TaskManager, BriefingGenerator, TaskManager]
            }
        );
    }

    #[test]
    fn self_loop_is_a_cycle() {
        use AgentType::*;
        let graph = graph_of(&[KpiAnalyzer], &[(KpiAnalyzer, KpiAnalyzer)]);
        assert!(matches!(
            validate(&graph),
            Err(GraphError::CycleDetected { .. })
        ));
    }

    #[test]
    fn cycle_not_reachable_from_first_node_is_found() {
        use AgentType::*;
        let graph = graph_of(
            &[MarketResearch, KpiAnalyzer, InvestorRelations, TaskManager],
            &[
                (KpiAnalyzer, InvestorRelations),
                (InvestorRelations, TaskManager),
                (TaskManager, KpiAnalyzer),
            ],
        );
        let err = validate(&graph).unwrap_err();
        assert!(err.to_string().starts_with("cycle detected"));
    }

    #[test]
    fn dangling_edge_is_rejected() {
        use AgentType::*;
        let graph = graph_of(&[KpiAnalyzer], &[(KpiAnalyzer, InvestorRelations)]);
        assert_eq!(
            validate(&graph).unwrap_err(),
            GraphError::DanglingEdge {
                from: KpiAnalyzer,
                to: InvestorRelations,
                missing: InvestorRelations,
            }
        );
    }

    #[test]
    fn dangling_source_is_rejected() {
        use AgentType::*;
        let graph = graph_of(&[TaskManager], &[(MeetingIntelligence, TaskManager)]);
        assert!(matches!(
            validate(&graph),
            Err(GraphError::DanglingEdge { missing: MeetingIntelligence, .. })
        ));
    }

    #[test]
    fn duplicate_agent_type_is_rejected() {
        use AgentType::*;
        let graph = graph_of(&[TaskManager, TaskManager], &[]);
        assert_eq!(
            validate(&graph).unwrap_err(),
            GraphError::DuplicateNode { agent_type: TaskManager }
        );
    }

    #[test]
    fn diamond_is_valid() {
        use AgentType::*;
        let graph = graph_of(
            &[MarketResearch, KpiAnalyzer, InvestorRelations, BriefingGenerator],
            &[
                (MarketResearch, KpiAnalyzer),
                (MarketResearch, InvestorRelations),
                (KpiAnalyzer, BriefingGenerator),
                (InvestorRelations, BriefingGenerator),
            ],
        );
        assert!(validate(&graph).is_ok());
    }

    /// Every edge subset over four agents agrees with petgraph's cycle check.
    #[test]
    fn agrees_with_petgraph_on_all_four_node_graphs() {
        use AgentType::*;
        let agents = [BriefingGenerator, TaskManager, RecommendationEngine, KpiAnalyzer];
        let candidates: Vec<(AgentType, AgentType)> = agents
            .iter()
            .flat_map(|from| agents.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from != to)
            .collect();

        for mask in 0u32..(1u32 << candidates.len()) {
            let edges: Vec<_> = candidates
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1u32 << *bit) != 0)
                .map(|(_, edge)| *edge)
                .collect();
            let graph = graph_of(&agents, &edges);

            let mut oracle = DiGraph::<AgentType, ()>::new();
            let indices: HashMap<_, _> = agents.iter().map(|a| (*a, oracle.add_node(*a))).collect();
            for (from, to) in &edges {
                oracle.add_edge(indices[from], indices[to], ());
            }

            assert_eq!(
                validate(&graph).is_err(),
                petgraph::algo::is_cyclic_directed(&oracle),
                "disagreement for edges {edges:?}"
            );
        }
    }
}
