//! Workflow execution records.
//!
//! A run owns an [`ExecutionContext`] that accumulates agent outputs and an
//! append-only list of [`ExecutionStep`]s, one per visited node. When the run
//! ends both are folded into a [`WorkflowExecution`], persisted once and never
//! mutated afterwards.

use crate::agent::AgentType;
use crate::aggregate::AggregatedResult;
use chrono::{DateTime, Utc};
use cofounder_core::{FounderId, TaskId, WorkflowExecutionId, WorkspaceId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// JSON object exchanged with agents.
pub type JsonMap = serde_json::Map<String, JsonValue>;

/// Reason recorded on steps skipped after an upstream failure.
pub const SKIPPED_AFTER_FAILURE: &str = "previous agent failed";

/// Outcome of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The agent finished and produced output.
    Completed,
    /// Dispatch failed or the agent reported failure.
    Failed,
    /// Never dispatched because an earlier step failed.
    Skipped,
}

/// Record of one visited node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub agent_type: AgentType,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(default)]
    pub output: JsonMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Why the step was skipped. Only set on skipped steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
}

impl ExecutionStep {
    #[must_use]
    pub fn completed(
        agent_type: AgentType,
        task_id: TaskId,
        output: JsonMap,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            agent_type,
            status: StepStatus::Completed,
            task_id: Some(task_id),
            output,
            error: None,
            reason: None,
            processing_time_ms: Some(processing_time_ms),
        }
    }

    /// A failed step. `task_id` is `None` when dispatch itself failed.
    #[must_use]
    pub fn failed(agent_type: AgentType, task_id: Option<TaskId>, error: impl Into<String>) -> Self {
        Self {
            agent_type,
            status: StepStatus::Failed,
            task_id,
            output: JsonMap::new(),
            error: Some(error.into()),
            reason: None,
            processing_time_ms: None,
        }
    }

    #[must_use]
    pub fn skipped(agent_type: AgentType) -> Self {
        Self {
            agent_type,
            status: StepStatus::Skipped,
            task_id: None,
            output: JsonMap::new(),
            error: None,
            reason: Some(SKIPPED_AFTER_FAILURE.to_string()),
            processing_time_ms: None,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }
}

/// Per-run accumulator of the objective, seed input and agent outputs.
///
/// Outputs are only ever added, and only for completed steps.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    objective: String,
    input_data: JsonMap,
    agent_outputs: BTreeMap<AgentType, JsonMap>,
}

impl ExecutionContext {
    #[must_use]
    pub fn new(objective: impl Into<String>, input_data: JsonMap) -> Self {
        Self {
            objective: objective.into(),
            input_data,
            agent_outputs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn objective(&self) -> &str {
        &self.objective
    }

    #[must_use]
    pub fn agent_outputs(&self) -> &BTreeMap<AgentType, JsonMap> {
        &self.agent_outputs
    }

    /// Builds the input for the next node.
    ///
    /// Starts from `{"objective": ...}`, overlays the top-level seed input
    /// (so a seed `objective` key wins), then adds `previousOutputs` keyed by
    /// agent type once any agent has produced output.
    #[must_use]
    pub fn node_input(&self) -> JsonMap {
        let mut input = JsonMap::new();
        input.insert(
            "objective".to_string(),
            JsonValue::String(self.objective.clone()),
        );
        for (key, value) in &self.input_data {
            input.insert(key.clone(), value.clone());
        }
        if !self.agent_outputs.is_empty() {
            let previous: JsonMap = self
                .agent_outputs
                .iter()
                .map(|(agent, output)| (agent.to_string(), JsonValue::Object(output.clone())))
                .collect();
            input.insert("previousOutputs".to_string(), JsonValue::Object(previous));
        }
        input
    }

    /// Merges a completed agent's output into the context.
    pub fn record_output(&mut self, agent_type: AgentType, output: &JsonMap) {
        let entry = self.agent_outputs.entry(agent_type).or_default();
        for (key, value) in output {
            entry.insert(key.clone(), value.clone());
        }
    }
}

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Completed,
    Failed,
}

impl WorkflowStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown workflow status: {other}")),
        }
    }
}

/// The persisted record of one workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecution {
    /// Assigned when the run starts.
    pub id: WorkflowExecutionId,
    pub workspace_id: WorkspaceId,
    pub founder_id: FounderId,
    pub workflow_type: String,
    pub objective: String,
    pub status: WorkflowStatus,
    pub steps: Vec<ExecutionStep>,
    /// Absent when the run failed before producing a step history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated_results: Option<AggregatedResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
