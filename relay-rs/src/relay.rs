//! Search relay server

use axum::{
    body::Bytes,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use research_core::schema::{
    normalize_search_response, validate_search_request, validate_search_response, ValidationError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::upstream::WebhookClient;

/// Shared relay state
pub struct RelayState {
    /// Research webhook client
    pub upstream: WebhookClient,
}

/// Relay server
pub struct RelayServer {
    config: RelayConfig,
    state: Arc<RelayState>,
}

impl RelayServer {
    /// Create a new relay server
    pub fn new(config: RelayConfig) -> Result<Self> {
        config.validate()?;

        let upstream = WebhookClient::new(
            config.upstream.webhook_url.trim(),
            Duration::from_secs(config.upstream.timeout_seconds),
        )?;

        Ok(Self {
            config,
            state: Arc::new(RelayState { upstream }),
        })
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_endpoint))
            .route("/api/search", post(search_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.server.listen_addr();
        let listener = TcpListener::bind(&addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        info!("Relay listening on {}", listener.local_addr()?);
        info!("Research service: {}", self.state.upstream.endpoint());
        info!("Mode: {}", self.config.server.mode);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Relay stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Health check endpoint
async fn health_endpoint() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "relay-rs",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Validate, forward to the research webhook, and return its reply as an array
async fn search_handler(
    State(state): State<Arc<RelayState>>,
    body: Bytes,
) -> std::result::Result<Json<Value>, RelayError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected search request with unparsable body: {}", e);
        RelayError::InvalidRequest(ValidationError::single(
            "body",
            format!("Invalid JSON: {}", e),
        ))
    })?;

    let request = validate_search_request(&payload).map_err(|e| {
        warn!("Rejected search request {}: {}", payload, e);
        RelayError::InvalidRequest(e)
    })?;

    info!("Relaying search: {:?}", request.query);

    let reply = state.upstream.search(&request).await.map_err(|e| {
        error!("Search relay failed for {:?}: {}", request.query, e);
        e
    })?;

    let normalized = normalize_search_response(reply);
    if let Err(e) = validate_search_response(&normalized) {
        error!(
            "Research service returned malformed results for {:?}: {}",
            request.query, e
        );
        return Err(RelayError::InvalidUpstreamResponse(e.to_string()));
    }

    Ok(Json(normalized))
}
