//! Agent types.
//!
//! An agent type names a kind of task handler behind the agent routing
//! service. Within a workflow graph the agent type *is* the node identity:
//! a graph contains at most one node per agent type, and edges connect
//! agent types rather than arbitrary node ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of agents a workflow can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    /// Produces the founder's daily or ad-hoc briefing.
    BriefingGenerator,
    /// Creates, updates and prioritizes tasks.
    TaskManager,
    /// Turns upstream findings into recommended next actions.
    RecommendationEngine,
    /// Summarizes meetings and extracts action items.
    MeetingIntelligence,
    /// Analyzes KPI movements and anomalies.
    KpiAnalyzer,
    /// Drafts investor updates and tracks investor relationships.
    InvestorRelations,
    /// Gathers market and competitor research.
    MarketResearch,
}

impl AgentType {
    /// Every agent type, in declaration order.
    pub const ALL: [AgentType; 7] = [
        Self::BriefingGenerator,
        Self::TaskManager,
        Self::RecommendationEngine,
        Self::MeetingIntelligence,
        Self::KpiAnalyzer,
        Self::InvestorRelations,
        Self::MarketResearch,
    ];

    /// Returns the wire name of this agent type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BriefingGenerator => "briefing_generator",
            Self::TaskManager => "task_manager",
            Self::RecommendationEngine => "recommendation_engine",
            Self::MeetingIntelligence => "meeting_intelligence",
            Self::KpiAnalyzer => "kpi_analyzer",
            Self::InvestorRelations => "investor_relations",
            Self::MarketResearch => "market_research",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known agent type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAgentType {
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for UnknownAgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown agent type: {}", self.value)
    }
}

impl std::error::Error for UnknownAgentType {}

impl FromStr for AgentType {
    type Err = UnknownAgentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|agent| agent.as_str() == s)
            .ok_or_else(|| UnknownAgentType {
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_name() {
        for agent in AgentType::ALL {
            let json = serde_json::to_string(&agent).expect("serialize");
            assert_eq!(json, format!("\"{agent}\""));
        }
    }

    #[test]
    fn parse_known_name() {
        let agent: AgentType = "kpi_analyzer".parse().expect("should parse");
        assert_eq!(agent, AgentType::KpiAnalyzer);
    }

    #[test]
    fn parse_unknown_name() {
        let err = "KpiAnalyzer".parse::<AgentType>().unwrap_err();
        assert!(err.to_string().contains("unknown agent type"));
    }
}
