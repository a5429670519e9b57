//! Health and cache management HTTP handlers

use axum::{Json, extract::State, response::Response};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::web::AppState;
use crate::web::handlers::{HealthResponse, handle_error, ok};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreloadResponse {
    pub requested: usize,
    pub resolved: usize,
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = match state.database.connection().ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!("Database health check failed: {}", e);
            "disconnected"
        }
    };

    ok(HealthResponse {
        status: if database == "connected" { "healthy" } else { "degraded" }.to_string(),
        database: database.to_string(),
        cache_entries: state.orchestrator.cache_stats().entries,
    })
}

/// GET /api/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Response {
    ok(state.orchestrator.cache_stats())
}

/// POST /api/cache/preload
///
/// Not bound by the request deadline; a dropped connection aborts it.
pub async fn preload(
    State(state): State<AppState>,
    Json(geohashes): Json<Vec<String>>,
) -> Response {
    info!(count = geohashes.len(), "Preloading cache");
    let token = CancellationToken::new();

    match state.orchestrator.preload(&geohashes, &token).await {
        Ok(resolved) => ok(PreloadResponse {
            requested: geohashes.len(),
            resolved,
        }),
        Err(e) => handle_error(e.into()),
    }
}
