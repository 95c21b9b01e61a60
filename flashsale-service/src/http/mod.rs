//! HTTP layer: the single admission endpoint plus liveness/readiness
//! checks.

pub mod health;
pub mod reservations;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
