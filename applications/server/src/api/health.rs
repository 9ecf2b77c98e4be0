/// Health check API routes
use crate::state::AppState;
use axum::{extract::State, Json};
use cadence_core::CatalogClient;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub catalog: CatalogHealth,
}

/// Outcome of the most recent catalog call; advisory only
#[derive(Debug, Serialize)]
pub struct CatalogHealth {
    pub healthy: bool,
}

/// GET /api/health - Health check endpoint
pub async fn health(State(app_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog: CatalogHealth {
            healthy: app_state.catalog.is_healthy(),
        },
    })
}
