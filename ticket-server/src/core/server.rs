//! Server Implementation
//!
//! HTTP 服务器启动和管理

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::core::{Config, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (for sharing with tests/tools)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Assemble the API router
    pub fn router(state: ServerState) -> Router {
        Router::new()
            .merge(api::health::router())
            .merge(api::checkout::router())
            .merge(api::callbacks::router())
            .merge(api::seatmap::router())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        state.start_background_tasks();

        let app = Self::router(state.clone());
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Ticket server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(state.shutdown.clone()))
            .await?;

        Ok(())
    }
}

/// Wait for ctrl-c, then stop the background tasks
async fn shutdown_signal(shutdown: tokio_util::sync::CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutting down...");
    shutdown.cancel();
}
