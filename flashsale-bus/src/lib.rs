//! The RabbitMQ-backed message bus for the flash-sale pipeline.
//!
//! Three queue kinds sit between the workflows: an immediate queue for
//! payment requests, a delay queue (TTL + dead-letter exchange) that turns
//! into a timeout queue once a reservation's payment window expires, and an
//! immediate queue for order creation. [`topology`] declares and purges all
//! of them on [`MessageBus::connect`].

mod error;
pub mod topology;

pub use error::BusError;

use std::sync::Arc;

use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// A connected handle to the broker. Cheaply cloneable: clones share the
/// underlying [`Connection`] and open independent channels per operation,
/// the same model `lapin`'s own examples use for multi-consumer programs.
#[derive(Clone)]
pub struct MessageBus {
    connection: Arc<Connection>,
}

impl MessageBus {
    /// Connects to the broker at `url` and declares the full topology with
    /// the default 15-minute delay-queue
    /// TTL, purging every queue of leftovers from a previous run.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ConnectionFailed`] if the broker is unreachable,
    /// or [`BusError::TopologySetupFailed`] if declaring or purging any
    /// queue/exchange fails.
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        Self::connect_with_ttl(url, topology::DEFAULT_DELAY_TTL_MS).await
    }

    /// Like [`MessageBus::connect`], but with an explicit delay-queue TTL
    /// in milliseconds. Exists so tests can shrink the 15-minute default to
    /// something a test can wait out.
    ///
    /// # Errors
    ///
    /// Same as [`MessageBus::connect`].
    #[instrument(skip_all, fields(url, delay_ttl_ms))]
    pub async fn connect_with_ttl(url: &str, delay_ttl_ms: i64) -> Result<Self, BusError> {
        let connection = Connection::connect(
            url,
            ConnectionProperties::default()
                .with_executor(tokio_executor_trait::Tokio::current())
                .with_reactor(tokio_reactor_trait::Tokio),
        )
        .await?;

        let bus = Self { connection: Arc::new(connection) };
        let channel = bus.connection.create_channel().await?;
        topology::declare_topology(&channel, delay_ttl_ms).await?;
        info!("message bus topology declared");

        Ok(bus)
    }

    /// Serializes `payload` as JSON and publishes it to `queue` as a
    /// persistent message.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::PublishFailed`] if the channel or publish
    /// confirmation fails.
    #[instrument(skip(self, payload), fields(queue))]
    pub async fn publish_json<T: Serialize + std::fmt::Debug>(
        &self,
        queue: &str,
        payload: &T,
    ) -> Result<(), BusError> {
        let body = serde_json::to_vec(payload)?;
        let channel = self.connection.create_channel().await?;

        channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await
            .map_err(|e| BusError::PublishFailed { queue: queue.to_string(), reason: e.to_string() })?
            .await
            .map_err(|e| BusError::PublishFailed { queue: queue.to_string(), reason: e.to_string() })?;

        Ok(())
    }

    /// Opens a manual-ack consumer on `queue` under `consumer_tag`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ConsumeFailed`] if the channel cannot be opened
    /// or the broker rejects the consume request.
    #[instrument(skip(self), fields(queue, consumer_tag))]
    pub async fn consume(&self, queue: &str, consumer_tag: &str) -> Result<BusConsumer, BusError> {
        let channel = self.connection.create_channel().await?;
        let consumer = channel
            .basic_consume(
                queue,
                consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::ConsumeFailed { queue: queue.to_string(), reason: e.to_string() })?;

        Ok(BusConsumer { inner: consumer, channel, queue: queue.to_string() })
    }
}

/// A manual-ack consumer over a single queue.
///
/// Each call to [`BusConsumer::next`] yields one [`Delivery`]; the caller is
/// responsible for acking or nacking it before requesting the next one, so a
/// crash mid-handler redelivers rather than silently drops — the
/// at-least-once guarantee the rest of the pipeline relies on.
pub struct BusConsumer {
    inner: Consumer,
    #[allow(dead_code)]
    channel: Channel,
    queue: String,
}

impl BusConsumer {
    /// Awaits the next delivery from the queue.
    ///
    /// Returns `None` when the underlying channel closes (broker shutdown or
    /// connection loss); callers should treat this as a signal to reconnect
    /// rather than a normal end-of-stream.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ConsumeFailed`] if the broker reports a delivery
    /// error on the stream.
    pub async fn next(&mut self) -> Option<Result<Delivery, BusError>> {
        let item = self.inner.next().await?;
        match item {
            Ok(delivery) => Some(Ok(Delivery { inner: delivery })),
            Err(e) => Some(Err(BusError::ConsumeFailed {
                queue: self.queue.clone(),
                reason: e.to_string(),
            })),
        }
    }
}

/// A single delivered message, not yet acknowledged.
pub struct Delivery {
    inner: lapin::message::Delivery,
}

impl Delivery {
    /// Deserializes the delivery body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Decode`] if the body is not valid JSON for `T` —
    /// a poison message; the caller should [`Delivery::nack_discard`] it
    /// rather than requeue.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BusError> {
        Ok(serde_json::from_slice(&self.inner.data)?)
    }

    /// Acknowledges successful processing; the broker removes the message.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::AckFailed`] if the ack could not be sent.
    #[instrument(skip(self))]
    pub async fn ack(&self) -> Result<(), BusError> {
        self.inner
            .ack(BasicAckOptions::default())
            .await
            .map_err(|e| BusError::AckFailed(e.to_string()))
    }

    /// Negatively acknowledges and requeues — for transient failures that
    /// should be retried.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::AckFailed`] if the nack could not be sent.
    #[instrument(skip(self))]
    pub async fn nack_requeue(&self) -> Result<(), BusError> {
        warn!("nacking delivery with requeue");
        self.inner
            .nack(BasicNackOptions { requeue: true, ..Default::default() })
            .await
            .map_err(|e| BusError::AckFailed(e.to_string()))
    }

    /// Negatively acknowledges without requeueing — for poison messages that
    /// will never succeed.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::AckFailed`] if the nack could not be sent.
    #[instrument(skip(self))]
    pub async fn nack_discard(&self) -> Result<(), BusError> {
        warn!("discarding poison delivery");
        self.inner
            .nack(BasicNackOptions { requeue: false, ..Default::default() })
            .await
            .map_err(|e| BusError::AckFailed(e.to_string()))
    }
}
