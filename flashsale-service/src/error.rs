//! Service-level error taxonomy: workflow outcomes and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flashsale_hotstore::HotStoreError;
use serde_json::json;
use thiserror::Error;

/// Outcome of the reservation workflow's `Reserve` entry point.
#[derive(Debug, Error)]
pub enum ReserveError {
    /// The showtime has no tickets remaining.
    #[error("tickets sold out")]
    SoldOut,

    /// The user already holds a reservation for this showtime.
    #[error("already ordered")]
    AlreadyOrdered,

    /// Admission succeeded but one of the follow-up publishes failed,
    /// stranding the reservation in `RESERVED`.
    #[error("post-admission publish failed: {0}")]
    PublishFailed(String),

    /// Any other infrastructure failure.
    #[error("internal error: {0}")]
    Infra(String),
}

impl From<HotStoreError> for ReserveError {
    fn from(err: HotStoreError) -> Self {
        match err {
            HotStoreError::SoldOut => Self::SoldOut,
            HotStoreError::AlreadyOrdered => Self::AlreadyOrdered,
            other => Self::Infra(other.to_string()),
        }
    }
}

impl IntoResponse for ReserveError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            Self::SoldOut => (
                StatusCode::CONFLICT,
                "Tickets sold out",
                "Sorry, all tickets for this showtime have been sold out",
            ),
            Self::AlreadyOrdered => (
                StatusCode::CONFLICT,
                "Already ordered",
                "You have already reserved a ticket for this showtime",
            ),
            Self::PublishFailed(reason) | Self::Infra(reason) => {
                tracing::error!(%reason, "reservation request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "Failed to process reservation, please try again later",
                )
            }
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}
