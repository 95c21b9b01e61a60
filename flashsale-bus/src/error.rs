//! Message-bus error taxonomy.

use thiserror::Error;

/// Errors surfaced by [`crate::MessageBus`].
#[derive(Debug, Error)]
pub enum BusError {
    /// Could not connect to the broker, or the connection dropped.
    #[error("broker connection failed: {0}")]
    ConnectionFailed(String),

    /// Declaring or purging a queue/exchange failed at startup.
    #[error("topology setup failed for '{target}': {reason}")]
    TopologySetupFailed {
        /// The queue or exchange name.
        target: String,
        /// The underlying broker error.
        reason: String,
    },

    /// Publishing a message to a queue failed.
    #[error("publish to '{queue}' failed: {reason}")]
    PublishFailed {
        /// The destination queue.
        queue: String,
        /// The underlying broker error.
        reason: String,
    },

    /// Starting a consumer on a queue failed.
    #[error("consume from '{queue}' failed: {reason}")]
    ConsumeFailed {
        /// The source queue.
        queue: String,
        /// The underlying broker error.
        reason: String,
    },

    /// Acknowledging (or negatively acknowledging) a delivery failed.
    #[error("delivery ack/nack failed: {0}")]
    AckFailed(String),

    /// A delivery's body could not be decoded as JSON — a poison message;
    /// callers nack without requeue and drop it.
    #[error("failed to decode message body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<lapin::Error> for BusError {
    fn from(err: lapin::Error) -> Self {
        Self::ConnectionFailed(err.to_string())
    }
}
