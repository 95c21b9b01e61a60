//! Configuration loaded from environment variables, mirroring the donor
//! `ticketing` example's `Config::from_env()` pattern: a struct composed of
//! sub-structs, each field read with a typed fallback.

use std::env;

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Durable store configuration.
    pub database: DatabaseConfig,
    /// Hot-store (Redis) configuration.
    pub cache: CacheConfig,
    /// Message-bus (RabbitMQ) configuration.
    pub bus: BusConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// Durable-store connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string.
    pub dsn: String,
    /// Maximum pool connections.
    pub max_connections: u32,
    /// Minimum idle pool connections.
    pub min_connections: u32,
}

/// Hot-store connection settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis connection URL.
    pub url: String,
    /// Default per-showtime capacity seeded at startup.
    pub default_capacity: i64,
}

/// Message-bus connection settings.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// RabbitMQ connection URL.
    pub url: String,
    /// Payment reservation hold window before timeout (15-minute default),
    /// expressed in seconds.
    pub reservation_ttl_secs: u64,
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub addr: String,
    /// Wall-clock deadline for inbound requests (default 5s).
    pub request_timeout_secs: u64,
    /// Max idle connections per host for any outbound HTTP client.
    pub max_idle_connections_per_host: usize,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Panics
    ///
    /// Panics if any of the four required variables (`DATABASE_DSN`,
    /// `ADDR`, `CACHE_URL`, `RABBIT_MQ_URL`) is unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig {
                dsn: required_var("DATABASE_DSN"),
                max_connections: parsed_var("DATABASE_MAX_CONNECTIONS", 10),
                min_connections: parsed_var("DATABASE_MIN_CONNECTIONS", 2),
            },
            cache: CacheConfig {
                url: required_var("CACHE_URL"),
                default_capacity: parsed_var("SHOWTIME_DEFAULT_CAPACITY", flashsale_core::DEFAULT_CAPACITY),
            },
            bus: BusConfig {
                url: required_var("RABBIT_MQ_URL"),
                reservation_ttl_secs: parsed_var("RESERVATION_TTL_SECS", 900),
            },
            server: ServerConfig {
                addr: required_var("ADDR"),
                request_timeout_secs: parsed_var("HTTP_REQUEST_TIMEOUT_SECS", 5),
                max_idle_connections_per_host: parsed_var("HTTP_MAX_IDLE_CONNECTIONS_PER_HOST", 10_000),
            },
        }
    }
}

#[allow(clippy::panic)]
fn required_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("missing required environment variable {name}"))
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}
