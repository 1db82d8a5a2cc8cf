//! Quote Store Port - Rate Log Persistence Interface
//!
//! Append-only log of observed quotes. Rows are never updated or
//! deleted; every fetch is a new observation, so duplicate appends
//! produce duplicate rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::quote::StoredRate;

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
  /// The store could not be reached (pool exhausted, connection refused).
  #[error("store connection error: {0}")]
  Connection(String),
  /// A read query failed.
  #[error("store query error: {0}")]
  Query(String),
  /// An insert failed (connectivity or constraint violation).
  #[error("store write error: {0}")]
  Write(String),
}

/// Trait for rate log providers.
///
/// A successful `append` must be visible to every `query` / `latest`
/// issued after it returns (no write-behind).
#[async_trait]
pub trait QuoteStore: Send + Sync + 'static {
  /// Append a new observation for `market`.
  async fn append(
    &self,
    market: &str,
    ask: &str,
    bid: &str,
    timestamp: DateTime<Utc>,
  ) -> Result<(), StoreError>;

  /// Rows for `market`, newest first, skipping `offset` and capped at `limit`.
  async fn query(
    &self,
    market: &str,
    limit: u32,
    offset: u32,
  ) -> Result<Vec<StoredRate>, StoreError>;

  /// Most recent row for `market`; `None` when nothing was stored yet.
  async fn latest(&self, market: &str) -> Result<Option<StoredRate>, StoreError>;

  /// Liveness probe on the underlying connection.
  async fn ping(&self) -> Result<(), StoreError>;
}
