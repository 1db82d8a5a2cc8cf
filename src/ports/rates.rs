//! Rates Port - Inbound Use-Case Interface
//!
//! The surface the RPC facade drives. Implemented by
//! `usecases::rate_service::RateService`; the facade only ever sees
//! this trait, so it can be exercised against a mock.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::quote::{Quote, StoredRate};
use crate::ports::quote_source::SourceError;
use crate::ports::quote_store::StoreError;

/// Errors surfaced by the rate use cases.
#[derive(Debug, Error)]
pub enum RateServiceError {
  /// The quote source failed; nothing was written.
  #[error("failed to get rates from upstream: {0}")]
  Upstream(#[from] SourceError),
  /// A read or health probe against the store failed.
  #[error("store unavailable: {0}")]
  Store(#[from] StoreError),
}

/// Rate use cases exposed to inbound adapters.
#[async_trait]
pub trait RatesApi: Send + Sync + 'static {
  /// Fetch a fresh quote and record it.
  async fn get_rates(&self, market: &str) -> Result<Quote, RateServiceError>;

  /// Most recently recorded rate for `market`.
  async fn get_latest_rate(
    &self,
    market: &str,
  ) -> Result<Option<StoredRate>, RateServiceError>;

  /// Recorded rates for `market`, newest first.
  async fn get_rates_history(
    &self,
    market: &str,
    limit: u32,
    offset: u32,
  ) -> Result<Vec<StoredRate>, RateServiceError>;

  /// Composite health: store is a hard dependency, the exchange a soft one.
  async fn health_check(&self) -> Result<(), RateServiceError>;
}
