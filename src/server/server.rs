use std::sync::Arc;
use anyhow::{Context, Result};
use axum::Router;
use tracing::info;
use crate::config::settings::SettingsConfig;
use crate::mcp::protocol::McpHandler;
use crate::observability::metrics::Metrics;
use crate::observability::routes::MetricsState;
use crate::server::routes;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub mcp: Arc<McpHandler>,
}

impl AppState {
    pub fn new(metrics: Arc<Metrics>, mcp: Arc<McpHandler>) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics),
            mcp,
        }
    }
}

/// Web front-end plus the optional metrics route.
pub fn router(settings_config: &SettingsConfig, state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
}

/// Start one Axum server for the web front-end and the HTTP MCP endpoint.
pub async fn start(settings_config: &SettingsConfig, state: AppState) -> Result<()> {
    let metrics = state.metrics_state.metrics.clone();
    let app = router(settings_config, state);

    let bind_addr = &settings_config.server.host;
    let port = &settings_config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port))
        .await
        .with_context(|| format!("failed to bind {}:{}", bind_addr, port))?;
    info!("http server listening on {}:{}", bind_addr, port);

    metrics.up.set(1);
    axum::serve(listener, app).await?;
    Ok(())
}
