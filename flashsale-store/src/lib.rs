//! The durable store.
//!
//! Backed by Postgres. Touched in exactly two places by the core: showtime
//! enumeration at startup (to seed hot-store inventory) and order insertion
//! by reservation id (to materialize a paid reservation). `User` and
//! `Movie` tables are created for referential completeness but never read
//! or written by the core — movie/showtime CRUD and auth are out of scope.

mod error;
pub mod models;

pub use error::StoreError;
pub use models::OrderRow;

use flashsale_core::{ReservationId, ShowtimeId, UserId};
use sqlx::PgPool;
use tracing::{debug, info, instrument};

/// A connected handle to the durable store.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connects to Postgres at `dsn` and ensures the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Infra`] if the connection or any migration
    /// statement fails.
    #[instrument(skip_all)]
    pub async fn connect(dsn: &str, max_connections: u32, min_connections: u32) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .connect(dsn)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!("durable store connected");
        Ok(store)
    }

    /// Builds a store around an existing pool, for tests.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY,
                name VARCHAR(64) NOT NULL UNIQUE,
                hashed_password TEXT NOT NULL,
                role VARCHAR(16) NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS movies (
                id BIGINT PRIMARY KEY,
                title VARCHAR(100) NOT NULL UNIQUE,
                description TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS showtimes (
                id BIGINT PRIMARY KEY,
                movie_id BIGINT NOT NULL,
                start_at TIMESTAMPTZ NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS orders (
                id BIGINT PRIMARY KEY,
                showtime_id BIGINT NOT NULL,
                user_id BIGINT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Enumerates every showtime id, to seed hot-store inventory at startup.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Infra`] on any query failure.
    #[instrument(skip(self))]
    pub async fn list_showtime_ids(&self) -> Result<Vec<ShowtimeId>, StoreError> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM showtimes ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id,)| ShowtimeId::from(u64::try_from(id).unwrap_or_default()))
            .collect())
    }

    /// Fetches an order by id, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Infra`] on any query failure.
    #[instrument(skip(self), fields(%reservation_id))]
    pub async fn get_order(&self, reservation_id: ReservationId) -> Result<Option<OrderRow>, StoreError> {
        let row: Option<(i64, i64, i64)> = sqlx::query_as(
            "SELECT id, showtime_id, user_id FROM orders WHERE id = $1",
        )
        .bind(i64::try_from(reservation_id.get()).unwrap_or(i64::MAX))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, showtime_id, user_id)| OrderRow {
            id: ReservationId::from(u64::try_from(id).unwrap_or_default()),
            showtime_id: ShowtimeId::from(u64::try_from(showtime_id).unwrap_or_default()),
            user_id: UserId::from(u64::try_from(user_id).unwrap_or_default()),
        }))
    }

    /// Inserts an order row keyed by reservation id, idempotently: a
    /// pre-existing row for the same id is left untouched rather than
    /// erroring, so redelivery of the same order-create message is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Infra`] on any query failure.
    #[instrument(skip(self), fields(%reservation_id, %showtime_id, %user_id))]
    pub async fn insert_order(
        &self,
        reservation_id: ReservationId,
        showtime_id: ShowtimeId,
        user_id: UserId,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO orders (id, showtime_id, user_id) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
        )
        .bind(i64::try_from(reservation_id.get()).unwrap_or(i64::MAX))
        .bind(i64::try_from(showtime_id.get()).unwrap_or(i64::MAX))
        .bind(i64::try_from(user_id.get()).unwrap_or(i64::MAX))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!("order already existed, insert was a no-op");
        }

        Ok(())
    }
}
