//! RPC Request/Response Types
//!
//! JSON wire messages of the `rates.RatesService` methods. Timestamps
//! are RFC 3339 strings in UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::quote::{Quote, StoredRate};

/// `GetRates` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetRatesRequest {
  /// Exchange market code.
  #[serde(default)]
  pub market: String,
}

/// `GetRates` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRatesResponse {
  pub ask: String,
  pub bid: String,
  pub timestamp: DateTime<Utc>,
  pub market: String,
}

impl From<Quote> for GetRatesResponse {
  fn from(quote: Quote) -> Self {
    Self {
      ask: quote.ask,
      bid: quote.bid,
      timestamp: quote.timestamp,
      market: quote.market,
    }
  }
}

/// Service health as reported by `Healthcheck`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
  Healthy,
  Unhealthy,
}

/// `Healthcheck` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthcheckResponse {
  pub status: HealthStatus,
  /// Service version.
  pub version: String,
  /// Time the check was answered.
  pub timestamp: DateTime<Utc>,
}

/// `GetLatestRate` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetLatestRateRequest {
  #[serde(default)]
  pub market: String,
}

/// `GetLatestRate` response; `rate` is `null` when nothing was stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLatestRateResponse {
  pub rate: Option<StoredRate>,
}

/// `GetRatesHistory` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetRatesHistoryRequest {
  #[serde(default)]
  pub market: String,
  /// Page size (default 100, max 1000).
  #[serde(default)]
  pub limit: Option<u32>,
  /// Rows to skip (default 0).
  #[serde(default)]
  pub offset: Option<u32>,
}

/// `GetRatesHistory` response, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRatesHistoryResponse {
  pub rates: Vec<StoredRate>,
}
