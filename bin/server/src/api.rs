//! HTTP API for workflow orchestration.
//!
//! - `POST /api/workflows/orchestrate` runs a workflow and returns its result
//! - `GET /api/workflows/types` lists the registered workflow types
//! - `GET /api/workflows/{id}` returns a persisted execution record

use crate::error::ApiError;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use cofounder_core::WorkflowExecutionId;
use cofounder_workflow::{
    AgentRouter, ExecutionStore, OrchestrateRequest, Orchestrator, WorkflowExecution,
    WorkflowExecutionResult,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the API router around a shared orchestrator.
pub fn router<R, S>(orchestrator: Arc<Orchestrator<R, S>>) -> Router
where
    R: AgentRouter + 'static,
    S: ExecutionStore + 'static,
{
    Router::new()
        .route("/api/workflows/orchestrate", post(orchestrate::<R, S>))
        .route("/api/workflows/types", get(workflow_types::<R, S>))
        .route("/api/workflows/{id}", get(get_execution::<R, S>))
        .layer(TraceLayer::new_for_http())
        .with_state(orchestrator)
}

async fn orchestrate<R, S>(
    State(orchestrator): State<Arc<Orchestrator<R, S>>>,
    Json(request): Json<OrchestrateRequest>,
) -> Json<WorkflowExecutionResult>
where
    R: AgentRouter,
    S: ExecutionStore,
{
    Json(orchestrator.orchestrate_workflow(request).await)
}

#[derive(Debug, Serialize)]
struct WorkflowTypes {
    workflow_types: Vec<String>,
}

async fn workflow_types<R, S>(State(orchestrator): State<Arc<Orchestrator<R, S>>>) -> Json<WorkflowTypes>
where
    R: AgentRouter,
    S: ExecutionStore,
{
    Json(WorkflowTypes {
        workflow_types: orchestrator
            .registry()
            .workflow_types()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

async fn get_execution<R, S>(
    State(orchestrator): State<Arc<Orchestrator<R, S>>>,
    Path(id): Path<String>,
) -> Result<Json<WorkflowExecution>, ApiError>
where
    R: AgentRouter,
    S: ExecutionStore,
{
    let execution_id: WorkflowExecutionId = id.parse().map_err(|e| ApiError::InvalidId {
        id: id.clone(),
        reason: format!("{e}"),
    })?;

    match orchestrator.get_execution(execution_id).await {
        Ok(Some(execution)) => Ok(Json(execution)),
        Ok(None) => Err(ApiError::NotFound { id }),
        Err(error) => Err(ApiError::Storage {
            details: error.to_string(),
        }),
    }
}
