//! Named workflow graph templates.
//!
//! The registry is built once at startup and shared read-only behind an
//! `Arc`. Lookups never fail: a name nobody registered resolves to the
//! default graph.

use crate::agent::AgentType;
use crate::edge::WorkflowEdge;
use crate::graph::WorkflowGraph;
use crate::node::WorkflowNode;
use std::collections::HashMap;

/// Workflow type used when a request does not name one.
pub const DEFAULT_WORKFLOW_TYPE: &str = "default-pipeline";

/// Immutable lookup table from workflow type names to graphs.
#[derive(Debug, Clone)]
pub struct WorkflowGraphRegistry {
    graphs: HashMap<String, WorkflowGraph>,
    default: WorkflowGraph,
}

impl WorkflowGraphRegistry {
    /// Starts building a registry whose fallback is the single-node briefing graph.
    #[must_use]
    pub fn builder() -> WorkflowGraphRegistryBuilder {
        WorkflowGraphRegistryBuilder::new()
    }

    /// The registry shipped with the service.
    #[must_use]
    pub fn builtin() -> Self {
        Self::builder()
            .register(DEFAULT_WORKFLOW_TYPE, default_graph())
            .register("daily-briefing", daily_briefing())
            .register("meeting-follow-up", meeting_follow_up())
            .register("kpi-review", kpi_review())
            .register("investor-update", investor_update())
            .build()
    }

    /// Returns the graph registered under `workflow_type`, or the default graph.
    #[must_use]
    pub fn resolve(&self, workflow_type: &str) -> &WorkflowGraph {
        self.graphs.get(workflow_type).unwrap_or(&self.default)
    }

    /// Returns true if `workflow_type` was registered explicitly.
    #[must_use]
    pub fn contains(&self, workflow_type: &str) -> bool {
        self.graphs.contains_key(workflow_type)
    }

    /// Registered workflow type names, sorted.
    #[must_use]
    pub fn workflow_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.graphs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The fallback graph for unregistered names.
    #[must_use]
    pub fn default_graph(&self) -> &WorkflowGraph {
        &self.default
    }
}

impl Default for WorkflowGraphRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Builder for [`WorkflowGraphRegistry`].
#[derive(Debug)]
pub struct WorkflowGraphRegistryBuilder {
    graphs: HashMap<String, WorkflowGraph>,
    default: WorkflowGraph,
}

impl WorkflowGraphRegistryBuilder {
    fn new() -> Self {
        Self {
            graphs: HashMap::new(),
            default: default_graph(),
        }
    }

    /// Registers `graph` under `name`, replacing any earlier registration.
    #[must_use]
    pub fn register(mut self, name: impl Into<String>, graph: WorkflowGraph) -> Self {
        self.graphs.insert(name.into(), graph);
        self
    }

    /// Replaces the fallback graph.
    #[must_use]
    pub fn with_default(mut self, graph: WorkflowGraph) -> Self {
        self.default = graph;
        self
    }

    #[must_use]
    pub fn build(self) -> WorkflowGraphRegistry {
        WorkflowGraphRegistry {
            graphs: self.graphs,
            default: self.default,
        }
    }
}

fn default_graph() -> WorkflowGraph {
    WorkflowGraph::single(WorkflowNode::new(
        "briefing",
        AgentType::BriefingGenerator,
        "Generate a briefing for the objective",
    ))
}

fn daily_briefing() -> WorkflowGraph {
    WorkflowGraph::new()
        .with_node(WorkflowNode::new(
            "briefing",
            AgentType::BriefingGenerator,
            "Summarize overnight activity into a morning briefing",
        ))
        .with_node(WorkflowNode::new(
            "tasks",
            AgentType::TaskManager,
            "Turn briefing highlights into prioritized tasks",
        ))
        .with_node(WorkflowNode::new(
            "recommendations",
            AgentType::RecommendationEngine,
            "Recommend the day's focus",
        ))
        .with_edge(
            WorkflowEdge::new(AgentType::BriefingGenerator, AgentType::TaskManager)
                .with_mapping("action_items", "tasks"),
        )
        .with_edge(
            WorkflowEdge::new(AgentType::TaskManager, AgentType::RecommendationEngine)
                .with_mapping("tasks", "open_tasks"),
        )
}

fn meeting_follow_up() -> WorkflowGraph {
    WorkflowGraph::new()
        .with_node(WorkflowNode::new(
            "meeting",
            AgentType::MeetingIntelligence,
            "Summarize the meeting and extract action items",
        ))
        .with_node(WorkflowNode::new(
            "tasks",
            AgentType::TaskManager,
            "Create follow-up tasks",
        ))
        .with_edge(
            WorkflowEdge::new(AgentType::MeetingIntelligence, AgentType::TaskManager)
                .with_mapping("action_items", "tasks"),
        )
}

fn kpi_review() -> WorkflowGraph {
    WorkflowGraph::new()
        .with_node(WorkflowNode::new(
            "kpis",
            AgentType::KpiAnalyzer,
            "Analyze KPI movements and anomalies",
        ))
        .with_node(WorkflowNode::new(
            "recommendations",
            AgentType::RecommendationEngine,
            "Recommend responses to KPI changes",
        ))
        .with_node(WorkflowNode::new(
            "briefing",
            AgentType::BriefingGenerator,
            "Write up the KPI review",
        ))
        .with_edge(
            WorkflowEdge::new(AgentType::KpiAnalyzer, AgentType::RecommendationEngine)
                .with_mapping("anomalies", "signals"),
        )
        .with_edge(WorkflowEdge::new(
            AgentType::RecommendationEngine,
            AgentType::BriefingGenerator,
        ))
}

fn investor_update() -> WorkflowGraph {
    WorkflowGraph::new()
        .with_node(WorkflowNode::new(
            "kpis",
            AgentType::KpiAnalyzer,
            "Collect headline metrics for the period",
        ))
        .with_node(WorkflowNode::new(
            "market",
            AgentType::MarketResearch,
            "Gather market context",
        ))
        .with_node(WorkflowNode::new(
            "update",
            AgentType::InvestorRelations,
            "Draft the investor update",
        ))
        .with_edge(
            WorkflowEdge::new(AgentType::KpiAnalyzer, AgentType::InvestorRelations)
                .with_mapping("metrics", "metrics"),
        )
        .with_edge(
            WorkflowEdge::new(AgentType::MarketResearch, AgentType::InvestorRelations)
                .with_mapping("findings", "market_context"),
        )
}
