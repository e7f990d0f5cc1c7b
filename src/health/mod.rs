/*!
 * # Health Check Module
 *
 * Endpoints for monitoring the service:
 *
 * - `/health` - up/down status with uptime and environment
 * - `/api/status` - API identification banner
 * - `/api/ping` - connectivity probe
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde_json::json;
use tracing::debug;

use crate::AppState;

/// Basic health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    debug!("health check endpoint called");

    (
        StatusCode::OK,
        Json(json!({
            "status": "OK",
            "timestamp": Utc::now().to_rfc3339(),
            "uptime": state.uptime_secs(),
            "environment": state.config.environment,
        })),
    )
}

/// API status banner.
pub async fn api_status() -> impl IntoResponse {
    Json(json!({
        "message": "FleetRent API funcionando correctamente",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Connectivity probe.
pub async fn api_ping() -> impl IntoResponse {
    Json(json!({
        "pong": true,
        "timestamp": Utc::now().timestamp_millis(),
    }))
}
