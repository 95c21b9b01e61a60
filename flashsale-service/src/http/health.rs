//! Liveness check, carried here as ambient operational surface per the
//! donor `ticketing` example's `server/health.rs`.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Health check response body.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` if the process is running.
    pub status: String,
}

/// `GET /health` — a liveness check with no dependency probing.
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "ok".to_string() }))
}
