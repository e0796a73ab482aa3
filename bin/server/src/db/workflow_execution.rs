//! PostgreSQL storage for workflow execution records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cofounder_core::{FounderId, WorkflowExecutionId, WorkspaceId};
use cofounder_workflow::{ExecutionStore, StoreError, WorkflowExecution, WorkflowStatus};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use tracing::instrument;

/// Row type for execution queries.
#[derive(Debug, FromRow)]
struct WorkflowExecutionRow {
    id: String,
    workspace_id: String,
    founder_id: String,
    workflow_type: String,
    objective: String,
    status: String,
    steps: serde_json::Value,
    aggregated_results: Option<serde_json::Value>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl WorkflowExecutionRow {
    fn try_into_record(self) -> Result<WorkflowExecution, StoreError> {
        let id = WorkflowExecutionId::from_str(&self.id).map_err(|e| StoreError::QueryFailed {
            message: format!("invalid execution id '{}': {e}", self.id),
        })?;
        let corrupt = move |message: String| StoreError::Corrupt { id, message };

        let workspace_id = WorkspaceId::from_str(&self.workspace_id)
            .map_err(|e| corrupt(format!("invalid workspace id '{}': {e}", self.workspace_id)))?;
        let founder_id = FounderId::from_str(&self.founder_id)
            .map_err(|e| corrupt(format!("invalid founder id '{}': {e}", self.founder_id)))?;
        let status = WorkflowStatus::from_str(&self.status).map_err(corrupt)?;
        let steps = serde_json::from_value(self.steps)
            .map_err(|e| corrupt(format!("invalid steps: {e}")))?;
        let aggregated_results = self
            .aggregated_results
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| corrupt(format!("invalid aggregated results: {e}")))?;

        Ok(WorkflowExecution {
            id,
            workspace_id,
            founder_id,
            workflow_type: self.workflow_type,
            objective: self.objective,
            status,
            steps,
            aggregated_results,
            error: self.error_message,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

fn query_failed(e: sqlx::Error) -> StoreError {
    StoreError::QueryFailed {
        message: e.to_string(),
    }
}

/// Execution store backed by the `workflow_executions` table.
#[derive(Debug, Clone)]
pub struct PgExecutionStore {
    pool: PgPool,
}

impl PgExecutionStore {
    /// Creates a new store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExecutionStore for PgExecutionStore {
    #[instrument(skip(self, record), fields(workflow_id = %record.id))]
    async fn insert_workflow_execution(
        &self,
        record: &WorkflowExecution,
    ) -> cofounder_core::Result<WorkflowExecutionId, StoreError> {
        let steps = serde_json::to_value(&record.steps).map_err(|e| StoreError::QueryFailed {
            message: format!("failed to encode steps: {e}"),
        })?;
        let aggregated_results = record
            .aggregated_results
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| StoreError::QueryFailed {
                message: format!("failed to encode aggregated results: {e}"),
            })?;

        sqlx::query(
            r#"
            INSERT INTO workflow_executions
                (id, workspace_id, founder_id, workflow_type, objective, status, steps,
                 aggregated_results, error_message, created_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.workspace_id.to_string())
        .bind(record.founder_id.to_string())
        .bind(&record.workflow_type)
        .bind(&record.objective)
        .bind(record.status.as_str())
        .bind(steps)
        .bind(aggregated_results)
        .bind(&record.error)
        .bind(record.created_at)
        .bind(record.completed_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(record.id)
    }

    async fn get_workflow_execution(
        &self,
        id: WorkflowExecutionId,
    ) -> cofounder_core::Result<Option<WorkflowExecution>, StoreError> {
        let row: Option<WorkflowExecutionRow> = sqlx::query_as(
            r#"
            SELECT id, workspace_id, founder_id, workflow_type, objective, status, steps,
                   aggregated_results, error_message, created_at, completed_at
            FROM workflow_executions
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        match row {
            Some(r) => Ok(Some(r.try_into_record()?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cofounder_workflow::{AgentType, ExecutionStep};
    use serde_json::json;

    fn row(id: WorkflowExecutionId) -> WorkflowExecutionRow {
        let now = Utc::now();
        WorkflowExecutionRow {
            id: id.to_string(),
            workspace_id: WorkspaceId::new().to_string(),
            founder_id: FounderId::new().to_string(),
            workflow_type: "meeting-follow-up".to_string(),
            objective: "Follow up with Acme".to_string(),
            status: "failed".to_string(),
            steps: serde_json::to_value(vec![
                ExecutionStep::failed(AgentType::MeetingIntelligence, None, "no transcript"),
                ExecutionStep::skipped(AgentType::TaskManager),
            ])
            .unwrap(),
            aggregated_results: None,
            error_message: Some("no transcript".to_string()),
            created_at: now,
            completed_at: now,
        }
    }

    #[test]
    fn row_decodes_into_record() {
        let id = WorkflowExecutionId::new();
        let record = row(id).try_into_record().expect("decode");

        assert_eq!(record.id, id);
        assert_eq!(record.status, WorkflowStatus::Failed);
        assert_eq!(record.steps.len(), 2);
        assert_eq!(record.steps[1].agent_type, AgentType::TaskManager);
        assert_eq!(record.error.as_deref(), Some("no transcript"));
        assert!(record.aggregated_results.is_none());
    }

    #[test]
    fn unknown_status_is_corrupt() {
        let id = WorkflowExecutionId::new();
        let mut row = row(id);
        row.status = "running".to_string();
        assert!(matches!(
            row.try_into_record(),
            Err(StoreError::Corrupt { id: corrupt_id, .. }) if corrupt_id == id
        ));
    }

    #[test]
    fn malformed_steps_are_corrupt() {
        let mut row = row(WorkflowExecutionId::new());
        row.steps = json!({"not": "a list"});
        let err = row.try_into_record().unwrap_err();
        assert!(err.to_string().contains("invalid steps"));
    }
}
