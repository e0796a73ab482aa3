//! Agent routing collaborator.
//!
//! The engine never talks to agents directly. It hands each node to an
//! [`AgentRouter`], which picks an agent instance and returns a task handle,
//! then polls the router until the task reaches a terminal status.

use crate::agent::AgentType;
use crate::execution::JsonMap;
use async_trait::async_trait;
use cofounder_core::{FounderId, TaskId, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Task priority understood by the routing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// A request to run one node on some agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub workspace_id: WorkspaceId,
    pub founder_id: FounderId,
    /// Short label for the kind of work, e.g. `close_q3_books:task_manager`.
    pub task_type: String,
    pub task_description: String,
    pub priority: TaskPriority,
    pub preferred_agent: AgentType,
    pub input_data: JsonMap,
    /// Run metadata for the agent's logs; not interpreted by the engine.
    #[serde(default)]
    pub context: JsonMap,
}

/// Handle returned by a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    pub id: TaskId,
}

/// Lifecycle status of a routed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Returns true once the task will not change status again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Snapshot of a routed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub status: TaskStatus,
    #[serde(default)]
    pub output_data: Option<JsonMap>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
}

/// Errors from the routing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The request could not be sent or the service answered with an error status.
    RequestFailed { message: String },
    /// The service answered with a body that could not be understood.
    InvalidResponse { message: String },
    /// The task id is unknown to the service.
    TaskNotFound { task_id: TaskId },
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { message } => write!(f, "routing request failed: {message}"),
            Self::InvalidResponse { message } => {
                write!(f, "invalid routing response: {message}")
            }
            Self::TaskNotFound { task_id } => write!(f, "task not found: {task_id}"),
        }
    }
}

impl std::error::Error for RoutingError {}

/// Dispatches tasks to agents and reports their progress.
///
/// Implementations must be shareable across concurrent runs.
#[async_trait]
pub trait AgentRouter: Send + Sync {
    /// Routes a task to an agent.
    ///
    /// `Ok(None)` means no agent accepted the task. The engine treats it the
    /// same as an error: the node fails.
    async fn route_task(
        &self,
        request: TaskRequest,
    ) -> cofounder_core::Result<Option<TaskHandle>, RoutingError>;

    /// Fetches the current state of a task. Must be idempotent.
    async fn get_task(&self, task_id: TaskId) -> cofounder_core::Result<Task, RoutingError>;
}

#[async_trait]
impl<T: AgentRouter + ?Sized> AgentRouter for Arc<T> {
    async fn route_task(
        &self,
        request: TaskRequest,
    ) -> cofounder_core::Result<Option<TaskHandle>, RoutingError> {
        (**self).route_task(request).await
    }

    async fn get_task(&self, task_id: TaskId) -> cofounder_core::Result<Task, RoutingError> {
        (**self).get_task(task_id).await
    }
}
