//! Durable-store error taxonomy.

use thiserror::Error;

/// Errors surfaced by [`crate::Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Any transient or permanent failure talking to Postgres. The order
    /// workflow treats every variant of this as transient and requeues.
    #[error("durable store unavailable: {0}")]
    Infra(#[from] sqlx::Error),
}
