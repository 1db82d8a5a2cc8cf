//! Postgres Quote Store - Pooled Append-only Rate Log
//!
//! Implements the `QuoteStore` port on a single `rates` table using
//! sqlx with runtime-checked queries. The pool is bounded (max open,
//! max lifetime) and shared by every request. It opens connections
//! lazily above a small idle floor; surplus idle connections are
//! closed after `idle_timeout`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, error, info, instrument};

use crate::domain::quote::StoredRate;
use crate::ports::quote_store::{QuoteStore, StoreError};

const CREATE_RATES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS rates (
    id         BIGSERIAL PRIMARY KEY,
    market     TEXT        NOT NULL,
    ask        TEXT        NOT NULL,
    bid        TEXT        NOT NULL,
    timestamp  TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

const CREATE_RATES_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_rates_market_created_at
    ON rates (market, created_at DESC)";

/// Connection pool settings for the Postgres store.
#[derive(Debug, Clone)]
pub struct PgStoreConfig {
    /// Postgres connection URL.
    pub url: String,
    /// Maximum open connections.
    pub max_open_conns: u32,
    /// Minimum connections kept open, even when idle.
    pub min_idle_conns: u32,
    /// Idle time after which a connection above the floor is closed.
    pub idle_timeout: Duration,
    /// Maximum lifetime of a pooled connection.
    pub conn_max_lifetime: Duration,
    /// How long a query waits for a free connection.
    pub acquire_timeout: Duration,
}

/// Row shape of the `rates` table.
#[derive(Debug, FromRow)]
struct RateRow {
    id: i64,
    market: String,
    ask: String,
    bid: String,
    timestamp: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<RateRow> for StoredRate {
    fn from(row: RateRow) -> Self {
        Self {
            id: row.id,
            market: row.market,
            ask: row.ask,
            bid: row.bid,
            timestamp: row.timestamp,
            created_at: row.created_at,
        }
    }
}

/// Postgres-backed rate log.
pub struct PgQuoteStore {
    pool: PgPool,
}

fn pool_options(config: &PgStoreConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(config.min_idle_conns.min(config.max_open_conns))
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.conn_max_lifetime)
        .acquire_timeout(config.acquire_timeout)
}

impl PgQuoteStore {
    /// Build the pool and verify it with a ping.
    pub async fn connect(config: &PgStoreConfig) -> Result<Self, StoreError> {
        let pool = pool_options(config)
            .connect(&config.url)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to open database");
                StoreError::Connection(e.to_string())
            })?;

        let store = Self { pool };
        store.ping().await?;

        info!(
            max_open = config.max_open_conns,
            min_idle = config.min_idle_conns,
            "Database connection established successfully"
        );

        Ok(store)
    }

    /// Create the `rates` table and its index if missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in [CREATE_RATES_TABLE, CREATE_RATES_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;
        }
        info!("Rates schema is up to date");
        Ok(())
    }

    /// Drain and close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Pool-level failures are connectivity problems; the rest are the query's.
fn is_connection_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed
    )
}

fn read_error(err: sqlx::Error) -> StoreError {
    if is_connection_error(&err) {
        StoreError::Connection(err.to_string())
    } else {
        StoreError::Query(err.to_string())
    }
}

fn write_error(err: sqlx::Error) -> StoreError {
    if is_connection_error(&err) {
        StoreError::Connection(err.to_string())
    } else {
        StoreError::Write(err.to_string())
    }
}

#[async_trait]
impl QuoteStore for PgQuoteStore {
    #[instrument(skip(self))]
    async fn append(
        &self,
        market: &str,
        ask: &str,
        bid: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        debug!("Saving rate to database");

        sqlx::query(
            "INSERT INTO rates (market, ask, bid, timestamp, created_at) \
             VALUES ($1, $2, $3, $4, NOW())",
        )
        .bind(market)
        .bind(ask)
        .bind(bid)
        .bind(timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to save rate");
            write_error(e)
        })?;

        info!("Rate saved successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn query(
        &self,
        market: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<StoredRate>, StoreError> {
        let rows = sqlx::query_as::<_, RateRow>(
            "SELECT id, market, ask, bid, timestamp, created_at \
             FROM rates \
             WHERE market = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(market)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to query rates");
            read_error(e)
        })?;

        debug!(count = rows.len(), "Retrieved rates from database");
        Ok(rows.into_iter().map(StoredRate::from).collect())
    }

    #[instrument(skip(self))]
    async fn latest(&self, market: &str) -> Result<Option<StoredRate>, StoreError> {
        let row = sqlx::query_as::<_, RateRow>(
            "SELECT id, market, ask, bid, timestamp, created_at \
             FROM rates \
             WHERE market = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT 1",
        )
        .bind(market)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to query latest rate");
            read_error(e)
        })?;

        if row.is_none() {
            debug!("No rates found");
        }
        Ok(row.map(StoredRate::from))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Database ping failed");
                StoreError::Connection(e.to_string())
            })?;
        Ok(())
    }
}
