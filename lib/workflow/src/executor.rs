//! Sequential workflow executor.
//!
//! Nodes run one at a time in topological order. Each node is dispatched to
//! the agent router and then polled until its task reaches a terminal status.
//! The first failed node short-circuits the run: every later node is recorded
//! as skipped without being dispatched.
//!
//! Two deadlines apply. A node whose task does not finish within the step
//! timeout aborts the whole run, as does exceeding the run timeout. An
//! aborted run keeps no step history.

use crate::agent::AgentType;
use crate::aggregate::UNKNOWN_ERROR;
use crate::config::OrchestratorConfig;
use crate::error::ExecutorError;
use crate::execution::{ExecutionContext, ExecutionStep, JsonMap, StepStatus};
use crate::node::WorkflowNode;
use crate::routing::{AgentRouter, Task, TaskPriority, TaskRequest, TaskStatus};
use cofounder_core::{FounderId, TaskId, WorkflowExecutionId, WorkspaceId};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Error recorded when no agent accepts a task.
pub const DISPATCH_FAILED: &str = "Failed to route task to agent";

/// Who and what a run is for.
#[derive(Debug, Clone, Copy)]
pub struct RunScope<'a> {
    pub workflow_id: WorkflowExecutionId,
    pub workspace_id: WorkspaceId,
    pub founder_id: FounderId,
    pub workflow_type: &'a str,
    pub objective: &'a str,
    pub input_data: &'a JsonMap,
}

/// Runs ordered nodes against an [`AgentRouter`].
#[derive(Debug, Clone)]
pub struct WorkflowExecutor<R> {
    router: R,
    poll_interval: Duration,
    step_timeout: Duration,
}

impl<R: AgentRouter> WorkflowExecutor<R> {
    pub fn new(router: R, poll_interval: Duration, step_timeout: Duration) -> Self {
        Self {
            router,
            poll_interval,
            step_timeout,
        }
    }

    pub fn from_config(router: R, config: &OrchestratorConfig) -> Self {
        Self::new(router, config.poll_interval(), config.step_timeout())
    }

    /// Returns the underlying router.
    pub fn router(&self) -> &R {
        &self.router
    }

    /// Executes `order` and returns one step per node.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutorError`] when a deadline passes or the router
    /// cannot be polled. Steps completed before the error are dropped.
    pub async fn execute(
        &self,
        scope: &RunScope<'_>,
        order: &[&WorkflowNode],
        run_timeout: Duration,
    ) -> Result<Vec<ExecutionStep>, ExecutorError> {
        match tokio::time::timeout(run_timeout, self.run_steps(scope, order)).await {
            Ok(result) => result,
            Err(_) => Err(ExecutorError::RunTimeout {
                timeout_secs: run_timeout.as_secs(),
            }),
        }
    }

    async fn run_steps(
        &self,
        scope: &RunScope<'_>,
        order: &[&WorkflowNode],
    ) -> Result<Vec<ExecutionStep>, ExecutorError> {
        let mut context = ExecutionContext::new(scope.objective, scope.input_data.clone());
        let mut steps: Vec<ExecutionStep> = Vec::with_capacity(order.len());

        for (index, node) in order.iter().enumerate() {
            if steps.iter().any(ExecutionStep::is_failed) {
                debug!(agent = %node.agent_type, "skipping agent after upstream failure");
                steps.push(ExecutionStep::skipped(node.agent_type));
                continue;
            }

            let step = self.run_node(scope, index, node, &context).await?;
            match step.status {
                StepStatus::Completed => {
                    context.record_output(node.agent_type, &step.output);
                }
                StepStatus::Failed => {
                    warn!(
                        workflow_id = %scope.workflow_id,
                        agent = %node.agent_type,
                        error = step.error.as_deref().unwrap_or(UNKNOWN_ERROR),
                        "agent failed"
                    );
                }
                StepStatus::Skipped => {}
            }
            steps.push(step);
        }

        Ok(steps)
    }

    async fn run_node(
        &self,
        scope: &RunScope<'_>,
        index: usize,
        node: &WorkflowNode,
        context: &ExecutionContext,
    ) -> Result<ExecutionStep, ExecutorError> {
        let agent_type = node.agent_type;
        let request = TaskRequest {
            workspace_id: scope.workspace_id,
            founder_id: scope.founder_id,
            task_type: task_type(context.objective(), agent_type),
            task_description: format!("{} for objective: {}", node.description, context.objective()),
            priority: TaskPriority::High,
            preferred_agent: agent_type,
            input_data: context.node_input(),
            context: request_context(scope, index, node),
        };

        let started = Instant::now();
        let handle = match self.router.route_task(request).await {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                warn!(agent = %agent_type, "no agent accepted the task");
                return Ok(ExecutionStep::failed(agent_type, None, DISPATCH_FAILED));
            }
            Err(error) => {
                warn!(agent = %agent_type, %error, "task dispatch failed");
                return Ok(ExecutionStep::failed(agent_type, None, DISPATCH_FAILED));
            }
        };
        debug!(agent = %agent_type, task_id = %handle.id, "task dispatched");

        let task = tokio::time::timeout(self.step_timeout, self.wait_for_task(node, handle.id))
            .await
            .map_err(|_| ExecutorError::StepTimeout {
                agent_type,
                task_id: handle.id,
                timeout_secs: self.step_timeout.as_secs(),
            })??;

        Ok(match task.status {
            TaskStatus::Completed => {
                let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                let processing_time_ms = task.processing_time_ms.unwrap_or(elapsed);
                info!(agent = %agent_type, task_id = %handle.id, processing_time_ms, "agent completed");
                ExecutionStep::completed(
                    agent_type,
                    handle.id,
                    task.output_data.unwrap_or_default(),
                    processing_time_ms,
                )
            }
            TaskStatus::Cancelled => ExecutionStep::failed(
                agent_type,
                Some(handle.id),
                task.error_message.unwrap_or_else(|| "task was cancelled".to_string()),
            ),
            _ => ExecutionStep::failed(
                agent_type,
                Some(handle.id),
                task.error_message.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            ),
        })
    }

    /// Polls until the task is terminal. Unbounded; the caller applies the deadline.
    async fn wait_for_task(&self, node: &WorkflowNode, task_id: TaskId) -> Result<Task, ExecutorError> {
        loop {
            let task = self
                .router
                .get_task(task_id)
                .await
                .map_err(|error| ExecutorError::Polling {
                    agent_type: node.agent_type,
                    task_id,
                    message: error.to_string(),
                })?;
            if task.status.is_terminal() {
                return Ok(task);
            }
            debug!(agent = %node.agent_type, %task_id, status = ?task.status, "task not finished");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Longest objective prefix carried in a task-type label.
const TASK_TYPE_OBJECTIVE_CHARS: usize = 48;

/// Builds the `{objective}:{agent}` task-type label.
///
/// The objective is reduced to lowercase alphanumeric words joined by `_`;
/// an objective with no such words falls back to `workflow_step`.
fn task_type(objective: &str, agent_type: AgentType) -> String {
    let mut slug = String::new();
    for word in objective
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        if !slug.is_empty() {
            slug.push('_');
        }
        slug.extend(word.chars().flat_map(char::to_lowercase));
    }
    let slug: String = slug.chars().take(TASK_TYPE_OBJECTIVE_CHARS).collect();
    let slug = slug.trim_end_matches('_');

    if slug.is_empty() {
        format!("workflow_step:{agent_type}")
    } else {
        format!("{slug}:{agent_type}")
    }
}

fn request_context(scope: &RunScope<'_>, index: usize, node: &WorkflowNode) -> JsonMap {
    let mut context = JsonMap::new();
    context.insert(
        "workflow_execution_id".to_string(),
        JsonValue::String(scope.workflow_id.as_uuid().to_string()),
    );
    context.insert(
        "workflow_type".to_string(),
        JsonValue::String(scope.workflow_type.to_string()),
    );
    context.insert("step_index".to_string(), JsonValue::from(index));
    context.insert("node_id".to_string(), JsonValue::String(node.id.clone()));
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::WorkflowGraphRegistry;
    use crate::testing::{SCRIPTED_PROCESSING_MS, Script, ScriptedRouter, object};
    use serde_json::json;

    const RUN_TIMEOUT: Duration = Duration::from_secs(300);

    fn scripted(router: ScriptedRouter) -> WorkflowExecutor<ScriptedRouter> {
        WorkflowExecutor::new(router, Duration::from_secs(1), Duration::from_secs(60))
    }

    async fn run(
        executor: &WorkflowExecutor<ScriptedRouter>,
        workflow_type: &str,
        run_timeout: Duration,
    ) -> Result<Vec<ExecutionStep>, ExecutorError> {
        let registry = WorkflowGraphRegistry::builtin();
        let graph = registry.resolve(workflow_type);
        let order = graph.execution_order();
        let input_data = object(json!({"quarter": "Q3"}));
        let scope = RunScope {
            workflow_id: WorkflowExecutionId::new(),
            workspace_id: WorkspaceId::new(),
            founder_id: FounderId::new(),
            workflow_type,
            objective: "Prepare the board meeting",
            input_data: &input_data,
        };
        executor.execute(&scope, &order, run_timeout).await
    }

    fn statuses(steps: &[ExecutionStep]) -> Vec<(AgentType, StepStatus)> {
        steps.iter().map(|step| (step.agent_type, step.status)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn all_agents_complete() {
        let executor = scripted(ScriptedRouter::new());
        let steps = run(&executor, "daily-briefing", RUN_TIMEOUT).await.expect("run");

        assert_eq!(
            statuses(&steps),
            vec![
                (AgentType::BriefingGenerator, StepStatus::Completed),
                (AgentType::TaskManager, StepStatus::Completed),
                (AgentType::RecommendationEngine, StepStatus::Completed),
            ]
        );
        assert!(steps.iter().all(|step| step.task_id.is_some()));
        assert_eq!(steps[0].processing_time_ms, Some(SCRIPTED_PROCESSING_MS));
    }

    #[tokio::test(start_paused = true)]
    async fn downstream_agents_see_previous_outputs() {
        let router = ScriptedRouter::new().with_script(
            AgentType::BriefingGenerator,
            Script::Complete(object(json!({"highlights": ["churn up"]}))),
        );
        let executor = scripted(router);
        run(&executor, "daily-briefing", RUN_TIMEOUT).await.expect("run");

        let requests = executor.router().requests();
        assert_eq!(requests.len(), 3);
        assert!(!requests[0].input_data.contains_key("previousOutputs"));
        assert_eq!(requests[0].input_data["quarter"], json!("Q3"));
        assert_eq!(
            requests[1].input_data["previousOutputs"]["briefing_generator"],
            json!({"highlights": ["churn up"]})
        );
        assert!(
            requests[2].input_data["previousOutputs"]
                .get("task_manager")
                .is_some()
        );
        assert!(requests.iter().all(|r| r.priority == TaskPriority::High));
        assert_eq!(requests[1].context["step_index"], json!(1));
        assert_eq!(
            requests[0].task_type,
            "prepare_the_board_meeting:briefing_generator"
        );
        assert_eq!(
            requests[2].task_type,
            "prepare_the_board_meeting:recommendation_engine"
        );
        let execution_id = requests[0].context["workflow_execution_id"]
            .as_str()
            .expect("execution id");
        assert!(!execution_id.starts_with("wfx_"));
        assert!(execution_id.parse::<WorkflowExecutionId>().is_ok());
    }

    #[test]
    fn task_type_combines_objective_and_agent() {
        assert_eq!(
            task_type("Raise seed round!", AgentType::InvestorRelations),
            "raise_seed_round:investor_relations"
        );
        assert_eq!(
            task_type("  --  ", AgentType::TaskManager),
            "workflow_step:task_manager"
        );
        let long = task_type(&"quarterly ".repeat(20), AgentType::KpiAnalyzer);
        let (objective, agent) = long.split_once(':').expect("label");
        assert!(objective.len() <= TASK_TYPE_OBJECTIVE_CHARS);
        assert!(!objective.ends_with('_'));
        assert_eq!(agent, "kpi_analyzer");
    }

    #[tokio::test(start_paused = true)]
    async fn failure_short_circuits_remaining_agents() {
        let router = ScriptedRouter::new().with_script(
            AgentType::TaskManager,
            Script::Fail(Some("task board unreachable".to_string())),
        );
        let executor = scripted(router);
        let steps = run(&executor, "daily-briefing", RUN_TIMEOUT).await.expect("run");

        assert_eq!(
            statuses(&steps),
            vec![
                (AgentType::BriefingGenerator, StepStatus::Completed),
                (AgentType::TaskManager, StepStatus::Failed),
                (AgentType::RecommendationEngine, StepStatus::Skipped),
            ]
        );
        assert_eq!(steps[1].error.as_deref(), Some("task board unreachable"));
        assert!(steps[2].task_id.is_none());
        assert!(steps[2].output.is_empty());
        assert_eq!(
            executor.router().dispatched_agents(),
            vec![AgentType::BriefingGenerator, AgentType::TaskManager]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_handle_fails_the_step() {
        let router = ScriptedRouter::new().with_script(AgentType::KpiAnalyzer, Script::NoHandle);
        let executor = scripted(router);
        let steps = run(&executor, "kpi-review", RUN_TIMEOUT).await.expect("run");

        assert_eq!(steps[0].status, StepStatus::Failed);
        assert_eq!(steps[0].error.as_deref(), Some(DISPATCH_FAILED));
        assert!(steps[0].task_id.is_none());
        assert!(steps[1..].iter().all(|step| step.status == StepStatus::Skipped));
    }

    #[tokio::test(start_paused = true)]
    async fn routing_error_fails_the_step() {
        let router = ScriptedRouter::new().with_script(AgentType::MeetingIntelligence, Script::RouteError);
        let executor = scripted(router);
        let steps = run(&executor, "meeting-follow-up", RUN_TIMEOUT).await.expect("run");

        assert_eq!(
            statuses(&steps),
            vec![
                (AgentType::MeetingIntelligence, StepStatus::Failed),
                (AgentType::TaskManager, StepStatus::Skipped),
            ]
        );
        assert_eq!(steps[0].error.as_deref(), Some(DISPATCH_FAILED));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_and_silent_failures_get_messages() {
        let router = ScriptedRouter::new()
            .with_script(AgentType::BriefingGenerator, Script::Cancel);
        let executor = scripted(router);
        let steps = run(&executor, "default-pipeline", RUN_TIMEOUT).await.expect("run");
        assert_eq!(steps[0].error.as_deref(), Some("task was cancelled"));

        let router = ScriptedRouter::new().with_script(AgentType::BriefingGenerator, Script::Fail(None));
        let executor = scripted(router);
        let steps = run(&executor, "default-pipeline", RUN_TIMEOUT).await.expect("run");
        assert_eq!(steps[0].error.as_deref(), Some(UNKNOWN_ERROR));
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_terminal() {
        let router = ScriptedRouter::new().with_script(
            AgentType::BriefingGenerator,
            Script::CompleteAfterPolls {
                polls: 3,
                output: object(json!({"done": true})),
            },
        );
        let executor = scripted(router);
        let steps = run(&executor, "default-pipeline", RUN_TIMEOUT).await.expect("run");
        assert_eq!(steps[0].status, StepStatus::Completed);
        assert_eq!(steps[0].output, object(json!({"done": true})));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_agent_times_out_the_step() {
        let router = ScriptedRouter::new().with_script(AgentType::TaskManager, Script::Stall);
        let executor = scripted(router);
        let err = run(&executor, "daily-briefing", RUN_TIMEOUT).await.unwrap_err();

        match &err {
            ExecutorError::StepTimeout {
                agent_type,
                timeout_secs,
                ..
            } => {
                assert_eq!(*agent_type, AgentType::TaskManager);
                assert_eq!(*timeout_secs, 60);
            }
            other => panic!("expected step timeout, got {other:?}"),
        }
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn run_deadline_discards_steps() {
        let router = ScriptedRouter::new().with_script(AgentType::RecommendationEngine, Script::Stall);
        let executor = scripted(router);
        let err = run(&executor, "daily-briefing", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err, ExecutorError::RunTimeout { timeout_secs: 5 });
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn polling_error_aborts_the_run() {
        let router = ScriptedRouter::new().with_script(AgentType::KpiAnalyzer, Script::BrokenPolling);
        let executor = scripted(router);
        let err = run(&executor, "investor-update", RUN_TIMEOUT).await.unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::Polling {
                agent_type: AgentType::KpiAnalyzer,
                ..
            }
        ));
    }
}
