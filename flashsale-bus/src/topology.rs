//! Queue and exchange names for the flash-sale bus topology.
//!
//! Names and the delay-queue TTL mirror the original `internal/mq`
//! package's queue constants one-for-one.

use lapin::options::{
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions, QueuePurgeOptions,
};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{Channel, ExchangeKind};

use crate::BusError;

/// Reservation workflow publishes here; the payment consumer reads from it.
pub const PAY_QUEUE: &str = "reservation.payment.pay.immediate";

/// Reservation workflow publishes here; messages sit for the configured
/// delay-queue TTL then dead-letter into [`TIMEOUT_QUEUE`].
pub const TIMEOUT_DELAY_QUEUE: &str = "reservation.payment.timeout.delay";

/// The payment consumer's timeout handler reads from here.
pub const TIMEOUT_QUEUE: &str = "reservation.payment.timeout.immediate";

/// The payment workflow publishes here on a successful mock payment; the
/// order consumer reads from it.
pub const ORDER_QUEUE: &str = "payment.order.create.immediate";

/// Dead-letter exchange that routes expired [`TIMEOUT_DELAY_QUEUE`]
/// messages into [`TIMEOUT_QUEUE`].
pub const TIMEOUT_EXCHANGE: &str = "reservation.timeout.exchange";

/// Routing key binding [`TIMEOUT_QUEUE`] to [`TIMEOUT_EXCHANGE`].
pub const TIMEOUT_ROUTING_KEY: &str = "reservation.timeout";

/// Payment hold window before a reservation dead-letters into the timeout
/// queue (15 minutes default, exposed as a parameter here so tests can
/// shrink it).
pub const DEFAULT_DELAY_TTL_MS: i64 = 900_000;

/// Declares every durable queue and exchange the pipeline needs, then purges
/// each queue of anything left over from a previous run. Purging on boot is
/// a known durability trade-off: in-flight messages from a prior run are
/// dropped rather than redelivered.
pub(crate) async fn declare_topology(channel: &Channel, delay_ttl_ms: i64) -> Result<(), BusError> {
    declare_immediate_queue(channel, PAY_QUEUE).await?;
    declare_delay_queue(channel, TIMEOUT_DELAY_QUEUE, TIMEOUT_EXCHANGE, TIMEOUT_ROUTING_KEY, delay_ttl_ms)
        .await?;
    declare_immediate_queue(channel, ORDER_QUEUE).await?;

    purge_queue(channel, PAY_QUEUE).await?;
    purge_queue(channel, TIMEOUT_DELAY_QUEUE).await?;
    purge_queue(channel, TIMEOUT_QUEUE).await?;
    purge_queue(channel, ORDER_QUEUE).await?;

    Ok(())
}

async fn declare_immediate_queue(channel: &Channel, name: &str) -> Result<(), BusError> {
    channel
        .queue_declare(name, QueueDeclareOptions { durable: true, ..Default::default() }, FieldTable::default())
        .await
        .map_err(|e| BusError::TopologySetupFailed {
            target: name.to_string(),
            reason: e.to_string(),
        })?;
    Ok(())
}

/// A delay queue is an immediate queue with a TTL and dead-letter routing
/// into a timeout exchange, plus the timeout queue bound to that exchange.
async fn declare_delay_queue(
    channel: &Channel,
    delay_queue: &str,
    timeout_exchange: &str,
    timeout_routing_key: &str,
    delay_ttl_ms: i64,
) -> Result<(), BusError> {
    let mut args = FieldTable::default();
    args.insert("x-message-ttl".into(), AMQPValue::LongInt(i32::try_from(delay_ttl_ms).unwrap_or(i32::MAX)));
    args.insert(
        "x-dead-letter-exchange".into(),
        AMQPValue::LongString(timeout_exchange.into()),
    );
    args.insert(
        "x-dead-letter-routing-key".into(),
        AMQPValue::LongString(timeout_routing_key.into()),
    );

    channel
        .queue_declare(delay_queue, QueueDeclareOptions { durable: true, ..Default::default() }, args)
        .await
        .map_err(|e| BusError::TopologySetupFailed {
            target: delay_queue.to_string(),
            reason: e.to_string(),
        })?;

    channel
        .exchange_declare(
            timeout_exchange,
            ExchangeKind::Direct,
            ExchangeDeclareOptions { durable: true, ..Default::default() },
            FieldTable::default(),
        )
        .await
        .map_err(|e| BusError::TopologySetupFailed {
            target: timeout_exchange.to_string(),
            reason: e.to_string(),
        })?;

    declare_immediate_queue(channel, TIMEOUT_QUEUE).await?;

    channel
        .queue_bind(
            TIMEOUT_QUEUE,
            timeout_exchange,
            timeout_routing_key,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(|e| BusError::TopologySetupFailed {
            target: TIMEOUT_QUEUE.to_string(),
            reason: e.to_string(),
        })?;

    Ok(())
}

async fn purge_queue(channel: &Channel, name: &str) -> Result<(), BusError> {
    channel
        .queue_purge(name, QueuePurgeOptions::default())
        .await
        .map_err(|e| BusError::TopologySetupFailed {
            target: name.to_string(),
            reason: e.to_string(),
        })?;
    Ok(())
}
