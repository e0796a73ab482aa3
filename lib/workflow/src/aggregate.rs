//! Reduction of per-node outcomes into a run summary.

use crate::agent::AgentType;
use crate::execution::{ExecutionStep, JsonMap, StepStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error text used for failed steps that carry no message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// A failed agent and its error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentError {
    pub agent: AgentType,
    pub error: String,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Display-only one-liner; not meant to be parsed.
    pub summary: String,
    pub total_agents: usize,
    pub successful_agents: usize,
    pub failed_agents: usize,
    pub skipped_agents: usize,
    /// Outputs of completed agents.
    pub agent_outputs: BTreeMap<AgentType, JsonMap>,
    /// `None` when no agent failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<AgentError>>,
    pub total_processing_time_ms: u64,
}

/// Summarizes a step list.
#[must_use]
pub fn summarize(steps: &[ExecutionStep]) -> AggregatedResult {
    let mut successful = 0;
    let mut failed = 0;
    let mut skipped = 0;
    let mut agent_outputs = BTreeMap::new();
    let mut errors = Vec::new();
    let mut total_processing_time_ms: u64 = 0;

    for step in steps {
        match step.status {
            StepStatus::Completed => {
                successful += 1;
                agent_outputs.insert(step.agent_type, step.output.clone());
            }
            StepStatus::Failed => {
                failed += 1;
                errors.push(AgentError {
                    agent: step.agent_type,
                    error: step
                        .error
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
                });
            }
            StepStatus::Skipped => skipped += 1,
        }
        if let Some(ms) = step.processing_time_ms {
            total_processing_time_ms = total_processing_time_ms.saturating_add(ms);
        }
    }

    AggregatedResult {
        summary: format!(
            "Executed {} agents: {successful} successful, {failed} failed, {skipped} skipped",
            steps.len()
        ),
        total_agents: steps.len(),
        successful_agents: successful,
        failed_agents: failed,
        skipped_agents: skipped,
        agent_outputs,
        errors: (!errors.is_empty()).then_some(errors),
        total_processing_time_ms,
    }
}
