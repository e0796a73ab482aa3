use cofounder_server::{
    api, config::ServerConfig, db::PgExecutionStore, error::StartupError, routing::HttpAgentRouter,
};
use cofounder_workflow::{Orchestrator, WorkflowGraphRegistry};
use rootcause::prelude::Report;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Report<StartupError>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().map_err(|e| StartupError::Config {
        details: e.to_string(),
    })?;
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| StartupError::Database {
            details: e.to_string(),
        })?;

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| StartupError::Database {
            details: e.to_string(),
        })?;

    let router = HttpAgentRouter::new(&config.agent_routing).map_err(|e| {
        StartupError::AgentRouting {
            details: e.to_string(),
        }
    })?;

    let registry = Arc::new(WorkflowGraphRegistry::builtin());
    tracing::info!(
        workflow_types = ?registry.workflow_types(),
        default_workflow_type = %config.orchestrator.default_workflow_type,
        "Registered workflow graphs"
    );

    let orchestrator = Arc::new(Orchestrator::new(
        registry,
        router,
        PgExecutionStore::new(db_pool),
        config.orchestrator,
    ));
    let app = api::router(orchestrator);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| StartupError::Serve {
            details: format!("failed to bind {}: {e}", config.listen_addr),
        })?;

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            details: e.to_string(),
        })?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
