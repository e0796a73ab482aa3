//! Workflow orchestration entry point.
//!
//! One call to [`Orchestrator::orchestrate_workflow`] drives a run from
//! request to persisted record:
//! 1. Resolve the workflow type to a graph
//! 2. Validate the graph and compute its execution order
//! 3. Execute the nodes
//! 4. Aggregate the steps into a summary
//! 5. Persist the execution record
//!
//! Every failure along the way is folded into the returned
//! [`WorkflowExecutionResult`]; orchestration itself never returns an error.

use crate::aggregate::{self, AggregatedResult};
use crate::config::OrchestratorConfig;
use crate::execution::{ExecutionStep, JsonMap, WorkflowExecution, WorkflowStatus};
use crate::executor::{RunScope, WorkflowExecutor};
use crate::recorder::{ExecutionRecorder, ExecutionStore, StoreError};
use crate::registry::WorkflowGraphRegistry;
use crate::routing::AgentRouter;
use chrono::{DateTime, Utc};
use cofounder_core::{FounderId, WorkflowExecutionId, WorkspaceId};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// A request to run one workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrateRequest {
    pub workspace_id: WorkspaceId,
    pub founder_id: FounderId,
    pub objective: String,
    #[serde(default)]
    pub input_data: JsonMap,
    /// Falls back to the configured default workflow type.
    #[serde(default)]
    pub workflow_type: Option<String>,
    /// Falls back to the configured run timeout.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl OrchestrateRequest {
    #[must_use]
    pub fn new(workspace_id: WorkspaceId, founder_id: FounderId, objective: impl Into<String>) -> Self {
        Self {
            workspace_id,
            founder_id,
            objective: objective.into(),
            input_data: JsonMap::new(),
            workflow_type: None,
            timeout_seconds: None,
        }
    }

    #[must_use]
    pub fn with_workflow_type(mut self, workflow_type: impl Into<String>) -> Self {
        self.workflow_type = Some(workflow_type.into());
        self
    }

    #[must_use]
    pub fn with_input(mut self, input_data: JsonMap) -> Self {
        self.input_data = input_data;
        self
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }
}

/// What the caller gets back from a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionResult {
    pub workflow_id: WorkflowExecutionId,
    pub status: WorkflowStatus,
    pub steps: Vec<ExecutionStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated_results: Option<AggregatedResult>,
    /// Set whenever `status` is failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// False when the record could not be stored.
    pub persisted: bool,
}

/// Coordinates registry, executor and recorder for workflow runs.
///
/// Cheap to share: all run state lives on the stack of each call, so
/// concurrent runs only share the collaborators and the registry.
pub struct Orchestrator<R, S> {
    registry: Arc<WorkflowGraphRegistry>,
    executor: WorkflowExecutor<R>,
    recorder: ExecutionRecorder<S>,
    config: OrchestratorConfig,
}

impl<R: AgentRouter, S: ExecutionStore> Orchestrator<R, S> {
    pub fn new(
        registry: Arc<WorkflowGraphRegistry>,
        router: R,
        store: S,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            executor: WorkflowExecutor::from_config(router, &config),
            recorder: ExecutionRecorder::new(store),
            config,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &WorkflowGraphRegistry {
        &self.registry
    }

    /// Runs a workflow to completion and persists the record.
    #[instrument(
        skip(self, request),
        fields(
            workspace_id = %request.workspace_id,
            founder_id = %request.founder_id,
            workflow_id = tracing::field::Empty,
        )
    )]
    pub async fn orchestrate_workflow(&self, request: OrchestrateRequest) -> WorkflowExecutionResult {
        let workflow_id = WorkflowExecutionId::new();
        let created_at = Utc::now();
        tracing::Span::current().record("workflow_id", tracing::field::display(workflow_id));

        let workflow_type = request
            .workflow_type
            .clone()
            .unwrap_or_else(|| self.config.default_workflow_type.clone());
        let run_timeout = request
            .timeout_seconds
            .map_or_else(|| self.config.run_timeout(), Duration::from_secs);

        info!(%workflow_id, %workflow_type, objective = %request.objective, "workflow started");

        let outcome = self
            .run(workflow_id, &workflow_type, &request, run_timeout)
            .await;

        let (status, steps, aggregated_results, error) = match outcome {
            Ok(steps) => {
                let status = if steps.iter().any(ExecutionStep::is_failed) {
                    WorkflowStatus::Failed
                } else {
                    WorkflowStatus::Completed
                };
                let error = steps
                    .iter()
                    .find(|step| step.is_failed())
                    .map(|step| {
                        step.error
                            .clone()
                            .unwrap_or_else(|| aggregate::UNKNOWN_ERROR.to_string())
                    });
                let summary = aggregate::summarize(&steps);
                (status, steps, Some(summary), error)
            }
            Err(message) => {
                error!(%workflow_id, error = %message, "workflow aborted");
                (WorkflowStatus::Failed, Vec::new(), None, Some(message))
            }
        };

        let record = WorkflowExecution {
            id: workflow_id,
            workspace_id: request.workspace_id,
            founder_id: request.founder_id,
            workflow_type,
            objective: request.objective,
            status,
            steps,
            aggregated_results,
            error,
            created_at,
            completed_at: Utc::now(),
        };
        let saved = self.recorder.save(&record).await;

        info!(
            %workflow_id,
            workflow_type = %record.workflow_type,
            status = %record.status,
            persisted = saved.persisted,
            "workflow finished"
        );

        WorkflowExecutionResult {
            workflow_id: saved.id,
            status: record.status,
            steps: record.steps,
            aggregated_results: record.aggregated_results,
            error: record.error,
            created_at,
            persisted: saved.persisted,
        }
    }

    /// Resolves, validates and executes; errors come back as display text.
    async fn run(
        &self,
        workflow_id: WorkflowExecutionId,
        workflow_type: &str,
        request: &OrchestrateRequest,
        run_timeout: Duration,
    ) -> Result<Vec<ExecutionStep>, String> {
        let graph = self.registry.resolve(workflow_type);
        if !self.registry.contains(workflow_type) {
            warn!(%workflow_type, "unknown workflow type, using default graph");
        }
        graph
            .validate()
            .map_err(|e| format!("invalid workflow graph: {e}"))?;
        let order = graph.execution_order();

        let scope = RunScope {
            workflow_id,
            workspace_id: request.workspace_id,
            founder_id: request.founder_id,
            workflow_type,
            objective: &request.objective,
            input_data: &request.input_data,
        };
        self.executor
            .execute(&scope, &order, run_timeout)
            .await
            .map_err(|e| e.to_string())
    }

    /// Loads a persisted execution record.
    ///
    /// # Errors
    ///
    /// Returns the store's error; an unknown id is `Ok(None)`.
    pub async fn get_execution(
        &self,
        id: WorkflowExecutionId,
    ) -> Result<Option<WorkflowExecution>, Report<StoreError>> {
        self.recorder.get(id).await
    }
}
