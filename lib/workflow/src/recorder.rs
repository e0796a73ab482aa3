//! Persistence of finished workflow executions.
//!
//! Saving is best effort: a storage failure is logged and reported through
//! [`SaveOutcome::persisted`], never turned into a failed run.

use crate::execution::WorkflowExecution;
use async_trait::async_trait;
use cofounder_core::WorkflowExecutionId;
use rootcause::Report;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Errors from the execution store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    Unavailable { message: String },
    /// A query failed.
    QueryFailed { message: String },
    /// A stored row could not be decoded into a record.
    Corrupt {
        id: WorkflowExecutionId,
        message: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { message } => write!(f, "execution store unavailable: {message}"),
            Self::QueryFailed { message } => write!(f, "execution store query failed: {message}"),
            Self::Corrupt { id, message } => {
                write!(f, "stored execution {id} is corrupt: {message}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable storage for execution records.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Inserts a finished record and returns the id it was stored under.
    async fn insert_workflow_execution(
        &self,
        record: &WorkflowExecution,
    ) -> cofounder_core::Result<WorkflowExecutionId, StoreError>;

    /// Fetches a record, or `None` if no record has that id.
    async fn get_workflow_execution(
        &self,
        id: WorkflowExecutionId,
    ) -> cofounder_core::Result<Option<WorkflowExecution>, StoreError>;
}

#[async_trait]
impl<T: ExecutionStore + ?Sized> ExecutionStore for Arc<T> {
    async fn insert_workflow_execution(
        &self,
        record: &WorkflowExecution,
    ) -> cofounder_core::Result<WorkflowExecutionId, StoreError> {
        (**self).insert_workflow_execution(record).await
    }

    async fn get_workflow_execution(
        &self,
        id: WorkflowExecutionId,
    ) -> cofounder_core::Result<Option<WorkflowExecution>, StoreError> {
        (**self).get_workflow_execution(id).await
    }
}

/// Result of [`ExecutionRecorder::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// The record's id, whether or not it was stored.
    pub id: WorkflowExecutionId,
    pub persisted: bool,
}

/// Saves and loads execution records through an [`ExecutionStore`].
#[derive(Debug, Clone)]
pub struct ExecutionRecorder<S> {
    store: S,
}

impl<S: ExecutionStore> ExecutionRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists `record`. Never fails; see [`SaveOutcome`].
    pub async fn save(&self, record: &WorkflowExecution) -> SaveOutcome {
        match self.store.insert_workflow_execution(record).await {
            Ok(stored_id) => {
                if stored_id != record.id {
                    warn!(
                        workflow_id = %record.id,
                        stored_id = %stored_id,
                        "execution store reported a different id; keeping the run id"
                    );
                }
                debug!(workflow_id = %record.id, "workflow execution persisted");
                SaveOutcome {
                    id: record.id,
                    persisted: true,
                }
            }
            Err(error) => {
                warn!(workflow_id = %record.id, %error, "failed to persist workflow execution");
                SaveOutcome {
                    id: record.id,
                    persisted: false,
                }
            }
        }
    }

    /// Loads a record by id.
    ///
    /// # Errors
    ///
    /// Returns the store's error; a missing record is `Ok(None)`.
    pub async fn get(
        &self,
        id: WorkflowExecutionId,
    ) -> Result<Option<WorkflowExecution>, Report<StoreError>> {
        self.store.get_workflow_execution(id).await
    }
}

/// Process-local execution store.
///
/// Records live only as long as the store. Used by tests and by deployments
/// that do not need executions to survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryExecutionStore {
    records: RwLock<HashMap<WorkflowExecutionId, WorkflowExecution>>,
}

impl InMemoryExecutionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn insert_workflow_execution(
        &self,
        record: &WorkflowExecution,
    ) -> cofounder_core::Result<WorkflowExecutionId, StoreError> {
        self.records.write().await.insert(record.id, record.clone());
        Ok(record.id)
    }

    async fn get_workflow_execution(
        &self,
        id: WorkflowExecutionId,
    ) -> cofounder_core::Result<Option<WorkflowExecution>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }
}
