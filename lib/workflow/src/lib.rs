//! Workflow orchestration engine for cofounder agents.
//!
//! This crate runs multi-agent pipelines modeled as DAGs:
//!
//! - **Graph Model**: agent-typed nodes and dependency edges, validated as a DAG
//! - **Registry**: named, immutable graph templates with a default fallback
//! - **Scheduling**: deterministic topological ordering
//! - **Execution**: sequential dispatch-and-poll through an agent router, with
//!   failure short-circuiting and step and run deadlines
//! - **Aggregation and Recording**: run summaries and best-effort persistence

pub mod agent;
pub mod aggregate;
pub mod config;
pub mod edge;
pub mod error;
pub mod execution;
pub mod executor;
pub mod graph;
pub mod node;
pub mod orchestrator;
pub mod recorder;
pub mod registry;
pub mod routing;
pub mod schedule;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{AgentType, UnknownAgentType};
pub use aggregate::{AgentError, AggregatedResult};
pub use config::OrchestratorConfig;
pub use edge::WorkflowEdge;
pub use error::{ExecutorError, GraphError};
pub use execution::{
    ExecutionContext, ExecutionStep, JsonMap, StepStatus, WorkflowExecution, WorkflowStatus,
};
pub use executor::{RunScope, WorkflowExecutor};
pub use graph::WorkflowGraph;
pub use node::WorkflowNode;
pub use orchestrator::{OrchestrateRequest, Orchestrator, WorkflowExecutionResult};
pub use recorder::{
    ExecutionRecorder, ExecutionStore, InMemoryExecutionStore, SaveOutcome, StoreError,
};
pub use registry::{DEFAULT_WORKFLOW_TYPE, WorkflowGraphRegistry};
pub use routing::{AgentRouter, RoutingError, Task, TaskHandle, TaskPriority, TaskRequest, TaskStatus};
