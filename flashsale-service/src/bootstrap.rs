//! Startup wiring: connects every infrastructure handle and seeds the hot
//! store from the durable store's showtime table.

use flashsale_bus::MessageBus;
use flashsale_hotstore::HotStore;
use flashsale_store::Store;
use tracing::info;

use crate::config::Config;

/// Every connected infrastructure handle the workflows need.
pub struct Handles {
    /// The atomic inventory/reservation layer.
    pub hot_store: HotStore,
    /// The message bus.
    pub bus: MessageBus,
    /// The durable store.
    pub store: Store,
}

/// Connects to Redis, RabbitMQ, and Postgres, then seeds the hot store
/// with every showtime id enumerated from the durable store.
///
/// # Errors
///
/// Propagates any connection or topology-declaration failure.
pub async fn connect(config: &Config) -> Result<Handles, Box<dyn std::error::Error>> {
    info!("connecting to durable store");
    let store = Store::connect(
        &config.database.dsn,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;

    info!("connecting to hot store");
    let hot_store = HotStore::connect(&config.cache.url).await?;

    info!("connecting to message bus");
    let delay_ttl_ms = i64::try_from(config.bus.reservation_ttl_secs.saturating_mul(1000))
        .unwrap_or(i64::MAX);
    let bus = MessageBus::connect_with_ttl(&config.bus.url, delay_ttl_ms).await?;

    let showtime_ids = store.list_showtime_ids().await?;
    info!(count = showtime_ids.len(), "seeding hot store from durable showtimes");
    hot_store.init(&showtime_ids, config.cache.default_capacity).await?;

    Ok(Handles { hot_store, bus, store })
}
