//! Liveness endpoints

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Status line the editor checks for on startup
pub const STATUS_MESSAGE: &str = "Piraeus Banter Backend is Running";

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /
pub async fn root_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: STATUS_MESSAGE.to_string(),
    })
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "banter-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build liveness routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_status))
        .route("/health", get(health_check))
}
