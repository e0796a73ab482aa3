//! Orchestrator tuning knobs.

use crate::registry::DEFAULT_WORKFLOW_TYPE;
use serde::Deserialize;
use std::time::Duration;

/// Timing and defaults for workflow runs.
///
/// Deserializes from any `config` source; absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrchestratorConfig {
    /// Delay between task status polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How long a single dispatched task may take before the run is aborted.
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,
    /// Run deadline used when a request does not carry its own.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
    /// Workflow type used when a request does not carry one.
    #[serde(default = "default_workflow_type")]
    pub default_workflow_type: String,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_step_timeout_secs() -> u64 {
    60
}

fn default_run_timeout_secs() -> u64 {
    300
}

fn default_workflow_type() -> String {
    DEFAULT_WORKFLOW_TYPE.to_string()
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            step_timeout_secs: default_step_timeout_secs(),
            run_timeout_secs: default_run_timeout_secs(),
            default_workflow_type: default_workflow_type(),
        }
    }
}

impl OrchestratorConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    #[must_use]
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}
