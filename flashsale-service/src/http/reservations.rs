//! The reservation endpoint.

use axum::extract::{FromRequest, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flashsale_core::{ShowtimeId, UserId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::state::AppState;
use crate::error::ReserveError;

/// A `Json` extractor whose rejection body matches the required 400 shape
/// (`{error:"Invalid request format", detail}`) instead of axum's default
/// rejection body.
pub struct ReserveJson(pub ReserveRequest);

impl<S: Send + Sync> FromRequest<S> for ReserveJson {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<ReserveRequest>::from_request(req, state).await {
            Ok(Json(body)) => Ok(Self(body)),
            Err(rejection) => Err((
                StatusCode::BAD_REQUEST,
                Json(InvalidRequestResponse {
                    error: "Invalid request format".to_string(),
                    detail: rejection.body_text(),
                }),
            )
                .into_response()),
        }
    }
}

/// `POST /reserve` request body.
#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    /// The requesting user's id.
    pub user_id: u64,
    /// The showtime being reserved against.
    pub showtime_id: u64,
}

/// `POST /reserve` success response body.
#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    /// A human-readable confirmation message.
    pub message: String,
    /// Always `"RESERVED"` on success.
    pub status: String,
    /// A note about the payment deadline.
    pub note: String,
}

/// `POST /reserve` malformed-body response.
#[derive(Debug, Serialize)]
pub struct InvalidRequestResponse {
    /// Always `"Invalid request format"`.
    pub error: String,
    /// The JSON deserialization error detail.
    pub detail: String,
}

/// Handles `POST /reserve`.
///
/// Axum's `Json<ReserveRequest>` extractor rejects malformed bodies before
/// this handler runs; a custom rejection type is used so the 400 response
/// matches the required exact shape (`{error, detail}`), not axum's
/// default rejection body.
#[instrument(skip(state), fields(user_id = %payload.user_id, showtime_id = %payload.showtime_id))]
pub async fn reserve(
    State(state): State<AppState>,
    ReserveJson(payload): ReserveJson,
) -> Result<(StatusCode, Json<ReserveResponse>), ReserveError> {
    state
        .reservation_workflow
        .reserve(UserId::from(payload.user_id), ShowtimeId::from(payload.showtime_id))
        .await?;

    Ok((
        StatusCode::OK,
        Json(ReserveResponse {
            message: "Ticket reserved successfully".to_string(),
            status: "RESERVED".to_string(),
            note: "Please complete payment within 15 minutes".to_string(),
        }),
    ))
}
