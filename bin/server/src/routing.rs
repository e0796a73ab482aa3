//! HTTP client for the agent routing service.
//!
//! - `POST {base}/tasks` dispatches a task; the body is a task handle or `null`
//! - `GET {base}/tasks/{id}` returns the task's current state

use crate::config::AgentRoutingConfig;
use async_trait::async_trait;
use cofounder_core::TaskId;
use cofounder_workflow::{AgentRouter, RoutingError, Task, TaskHandle, TaskRequest};
use reqwest::StatusCode;
use rootcause::prelude::Report;
use tracing::{debug, instrument, warn};

/// Agent router backed by the routing service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpAgentRouter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAgentRouter {
    /// Creates a client for the configured routing service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AgentRoutingConfig) -> Result<Self, Report<RoutingError>> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RoutingError::RequestFailed {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }
}

async fn error_body(response: reqwest::Response) -> RoutingError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    RoutingError::RequestFailed {
        message: format!("HTTP {status}: {body}"),
    }
}

#[async_trait]
impl AgentRouter for HttpAgentRouter {
    #[instrument(skip(self, request), fields(agent = %request.preferred_agent))]
    async fn route_task(
        &self,
        request: TaskRequest,
    ) -> cofounder_core::Result<Option<TaskHandle>, RoutingError> {
        let url = self.tasks_url();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, endpoint = %url, "failed to reach agent routing service");
                RoutingError::RequestFailed {
                    message: e.to_string(),
                }
            })?;

        if !response.status().is_success() {
            return Err(error_body(response).await.into());
        }

        let handle: Option<TaskHandle> =
            response
                .json()
                .await
                .map_err(|e| RoutingError::InvalidResponse {
                    message: e.to_string(),
                })?;
        debug!(task_id = ?handle.map(|h| h.id), "routing service answered");
        Ok(handle)
    }

    async fn get_task(&self, task_id: TaskId) -> cofounder_core::Result<Task, RoutingError> {
        let url = format!("{}/{}", self.tasks_url(), task_id.as_uuid());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RoutingError::RequestFailed {
                message: e.to_string(),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RoutingError::TaskNotFound { task_id }.into());
        }
        if !response.status().is_success() {
            return Err(error_body(response).await.into());
        }

        let task: Task = response
            .json()
            .await
            .map_err(|e| RoutingError::InvalidResponse {
                message: e.to_string(),
            })?;
        Ok(task)
    }
}
