//! Web layer module
//!
//! HTTP interface for GeoNimbus. Handlers are thin and delegate to the
//! [`GeoQueryOrchestrator`]; responses share one JSON envelope and errors are
//! mapped to status codes in [`responses`].
//!
//! Routes:
//! - `/geocode/*`: address lookups and spatial queries
//! - `/api/*`: geohash utilities, health and cache management

use anyhow::Result;
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{config::Config, database::Database, services::GeoQueryOrchestrator};

pub mod handlers;
pub mod responses;
pub mod utils;

pub use responses::{ApiResponse, handle_error};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<GeoQueryOrchestrator>,
    pub database: Database,
    pub config: Config,
}

impl AppState {
    pub fn request_timeout(&self) -> Duration {
        self.config.web.request_timeout
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr =
            format!("{}:{}", state.config.web.host, state.config.web.port).parse()?;
        let app = Self::create_router(state);
        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .nest("/geocode", Self::geocode_routes())
            .nest("/api", Self::api_routes())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    fn geocode_routes() -> Router<AppState> {
        use handlers::geocode;

        Router::new()
            .route("/id/{id}", get(geocode::get_by_id))
            .route("/geocode", get(geocode::geocode))
            .route("/reverse-geocode", get(geocode::reverse_geocode))
            .route(
                "/reverse-geocode/batch",
                post(geocode::batch_reverse_geocode),
            )
            .route("/bbox", get(geocode::bounding_box))
            .route("/radius", get(geocode::radius))
            .route("/geohash", get(geocode::geohash))
            .route("/geohash-prefix", get(geocode::geohash_prefix))
            .route("/nearest", get(geocode::nearest))
    }

    fn api_routes() -> Router<AppState> {
        use handlers::{geohash, management};

        Router::new()
            .route("/encode", get(geohash::encode))
            .route("/decode", get(geohash::decode))
            .route("/health", get(management::health_check))
            .route("/cache/stats", get(management::cache_stats))
            .route("/cache/preload", post(management::preload))
    }

    /// Serve until the token fires, or SIGINT/SIGTERM when no token is given
    pub async fn serve_with_cancellation(
        self,
        ready_signal: tokio::sync::oneshot::Sender<Result<()>>,
        cancellation_token: Option<CancellationToken>,
    ) -> Result<()> {
        match tokio::net::TcpListener::bind(&self.addr).await {
            Ok(listener) => {
                let _ = ready_signal.send(Ok(()));
                info!("Listening on http://{}", self.addr);

                let shutdown_signal = async move {
                    match cancellation_token {
                        Some(token) => {
                            token.cancelled().await;
                            info!("Web server received cancellation signal, shutting down gracefully");
                        }
                        None => wait_for_shutdown_signal().await,
                    }
                };

                axum::serve(listener, self.app)
                    .with_graceful_shutdown(shutdown_signal)
                    .await?;
                Ok(())
            }
            Err(bind_error) => {
                let bind_err_msg = format!("Failed to bind to {}: {}", self.addr, bind_error);
                let _ = ready_signal.send(Err(anyhow::anyhow!("{}", bind_err_msg)));
                Err(anyhow::anyhow!("{}", bind_err_msg))
            }
        }
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                    _ = sigint.recv() => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
                }
            }
            _ => {
                tracing::error!("Failed to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C, shutting down gracefully");
    }
}
