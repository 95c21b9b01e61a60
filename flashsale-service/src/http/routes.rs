//! Router assembly, grounded on the donor `ticketing` example's
//! `server/routes.rs`.

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::health::health_check;
use super::reservations::reserve;
use super::state::AppState;

/// Builds the complete router: `/reserve`, `/health`, request tracing, and
/// a wall-clock request timeout (default 5s, configured by the caller).
#[must_use]
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/reserve", post(reserve))
        .route("/health", get(health_check))
        .layer(tower_http::timeout::TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
