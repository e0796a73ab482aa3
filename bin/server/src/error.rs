//! Domain error types for server operations.
//!
//! Startup failures travel as `rootcause::Report<StartupError>`; request
//! failures become [`ApiError`], which renders a JSON error body without
//! leaking internal details.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

/// Errors that stop the server from starting.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration is missing or invalid.
    Config { details: String },
    /// The database could not be reached or migrated.
    Database { details: String },
    /// The agent routing client could not be built.
    AgentRouting { details: String },
    /// The listener could not be bound or the server stopped unexpectedly.
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "invalid configuration: {details}"),
            Self::Database { details } => write!(f, "database setup failed: {details}"),
            Self::AgentRouting { details } => {
                write!(f, "agent routing client setup failed: {details}")
            }
            Self::Serve { details } => write!(f, "server error: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}

/// Workflow API errors.
#[derive(Debug)]
pub enum ApiError {
    /// The path did not contain a valid execution id.
    InvalidId { id: String, reason: String },
    /// No execution has the requested id.
    NotFound { id: String },
    /// The execution store failed.
    Storage { details: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId { id, reason } => write!(f, "invalid workflow id '{id}': {reason}"),
            Self::NotFound { id } => write!(f, "workflow execution '{id}' not found"),
            Self::Storage { details } => write!(f, "execution store error: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidId { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Storage { details } => {
                tracing::error!(%details, "execution store error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match &self {
            Self::Storage { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
