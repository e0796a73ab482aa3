//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys use
//! a double underscore, e.g. `AGENT_ROUTING__BASE_URL` or
//! `ORCHESTRATOR__STEP_TIMEOUT_SECS`.
//!
//! See [`OrchestratorConfig`] for workflow timing configuration.

use cofounder_workflow::OrchestratorConfig;
use serde::Deserialize;
use std::time::Duration;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Address the HTTP API listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Agent routing service configuration.
    pub agent_routing: AgentRoutingConfig,

    /// Workflow timing and defaults.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Where and how to reach the agent routing service.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentRoutingConfig {
    /// Base URL, e.g. `http://agent-routing:8080/api`.
    pub base_url: String,

    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl AgentRoutingConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
