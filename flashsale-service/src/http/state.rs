//! Shared state for HTTP handlers.

use crate::workflows::ReservationWorkflow;

/// State cloned (cheaply) into every request handler.
#[derive(Clone)]
pub struct AppState {
    /// The reservation workflow invoked by `POST /reserve`.
    pub reservation_workflow: ReservationWorkflow,
}

impl AppState {
    /// Builds application state around an already-wired workflow.
    #[must_use]
    pub const fn new(reservation_workflow: ReservationWorkflow) -> Self {
        Self { reservation_workflow }
    }
}
