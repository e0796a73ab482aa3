//! Test doubles for the routing and storage collaborators.

use crate::agent::AgentType;
use crate::execution::{JsonMap, WorkflowExecution};
use crate::recorder::{ExecutionStore, StoreError};
use crate::routing::{AgentRouter, RoutingError, Task, TaskHandle, TaskRequest, TaskStatus};
use async_trait::async_trait;
use cofounder_core::{TaskId, WorkflowExecutionId};
use std::collections::HashMap;
use std::sync::Mutex;

/// Processing time reported by scripted agents that complete.
pub const SCRIPTED_PROCESSING_MS: u64 = 25;

/// How a scripted agent behaves.
#[derive(Debug, Clone)]
pub enum Script {
    /// Completes on the first poll.
    Complete(JsonMap),
    /// Reports `Processing` for `polls` polls, then completes.
    CompleteAfterPolls { polls: usize, output: JsonMap },
    /// Reports `Failed` with the given message.
    Fail(Option<String>),
    /// Reports `Cancelled`.
    Cancel,
    /// Dispatch returns no handle.
    NoHandle,
    /// Dispatch returns an error.
    RouteError,
    /// Stays `Processing` forever.
    Stall,
    /// Polling returns an error.
    BrokenPolling,
}

/// Agent router driven by per-agent scripts. Unscripted agents complete
/// immediately with `{"agent": "<agent type>"}`.
#[derive(Debug, Default)]
pub struct ScriptedRouter {
    scripts: HashMap<AgentType, Script>,
    tasks: Mutex<HashMap<TaskId, (AgentType, usize)>>,
    requests: Mutex<Vec<TaskRequest>>,
}

impl ScriptedRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, agent_type: AgentType, script: Script) -> Self {
        self.scripts.insert(agent_type, script);
        self
    }

    /// Every dispatch request received, in order.
    pub fn requests(&self) -> Vec<TaskRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn dispatched_agents(&self) -> Vec<AgentType> {
        self.requests()
            .iter()
            .map(|request| request.preferred_agent)
            .collect()
    }

    fn script_for(&self, agent_type: AgentType) -> Script {
        self.scripts.get(&agent_type).cloned().unwrap_or_else(|| {
            let mut output = JsonMap::new();
            output.insert("agent".to_string(), agent_type.as_str().into());
            Script::Complete(output)
        })
    }
}

fn task(id: TaskId, status: TaskStatus) -> Task {
    Task {
        id,
        status,
        output_data: None,
        error_message: None,
        processing_time_ms: None,
    }
}

fn completed(id: TaskId, output: JsonMap) -> Task {
    Task {
        output_data: Some(output),
        processing_time_ms: Some(SCRIPTED_PROCESSING_MS),
        ..task(id, TaskStatus::Completed)
    }
}

#[async_trait]
impl AgentRouter for ScriptedRouter {
    async fn route_task(
        &self,
        request: TaskRequest,
    ) -> cofounder_core::Result<Option<TaskHandle>, RoutingError> {
        let agent_type = request.preferred_agent;
        self.requests.lock().unwrap().push(request);

        match self.script_for(agent_type) {
            Script::NoHandle => Ok(None),
            Script::RouteError => Err(RoutingError::RequestFailed {
                message: "routing service unavailable".to_string(),
            }
            .into()),
            _ => {
                let id = TaskId::new();
                self.tasks.lock().unwrap().insert(id, (agent_type, 0));
                Ok(Some(TaskHandle { id }))
            }
        }
    }

    async fn get_task(&self, task_id: TaskId) -> cofounder_core::Result<Task, RoutingError> {
        let (agent_type, polls) = {
            let mut tasks = self.tasks.lock().unwrap();
            let Some(entry) = tasks.get_mut(&task_id) else {
                return Err(RoutingError::TaskNotFound { task_id }.into());
            };
            entry.1 += 1;
            *entry
        };

        let task = match self.script_for(agent_type) {
            Script::Complete(output) => completed(task_id, output),
            Script::CompleteAfterPolls { polls: wait, output } if polls > wait => {
                completed(task_id, output)
            }
            Script::CompleteAfterPolls { .. } | Script::Stall => {
                task(task_id, TaskStatus::Processing)
            }
            Script::Fail(message) => Task {
                error_message: message,
                ..task(task_id, TaskStatus::Failed)
            },
            Script::Cancel => task(task_id, TaskStatus::Cancelled),
            Script::BrokenPolling => {
                return Err(RoutingError::InvalidResponse {
                    message: "truncated body".to_string(),
                }
                .into());
            }
            Script::NoHandle | Script::RouteError => {
                return Err(RoutingError::TaskNotFound { task_id }.into());
            }
        };
        Ok(task)
    }
}

/// Execution store whose every call fails.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl ExecutionStore for FailingStore {
    async fn insert_workflow_execution(
        &self,
        _record: &WorkflowExecution,
    ) -> cofounder_core::Result<WorkflowExecutionId, StoreError> {
        Err(StoreError::Unavailable {
            message: "connection reset".to_string(),
        }
        .into())
    }

    async fn get_workflow_execution(
        &self,
        _id: WorkflowExecutionId,
    ) -> cofounder_core::Result<Option<WorkflowExecution>, StoreError> {
        Err(StoreError::QueryFailed {
            message: "connection reset".to_string(),
        }
        .into())
    }
}

/// Builds a JSON object from a `json!` literal.
pub fn object(value: serde_json::Value) -> JsonMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
