//! Grinex Depth API Types
//!
//! Deserialization types for `GET /api/v2/depth`. Missing arrays and
//! missing level fields decode to empty values rather than errors, so
//! a thin book is reported through the sentinel price, not a failure.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::quote::{Quote, observation_time};

/// One price level of the depth snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepthLevel {
  /// Exchange-formatted price.
  #[serde(default)]
  pub price: String,
  /// Volume available at this price.
  #[serde(default)]
  pub volume: String,
}

/// Depth snapshot response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepthResponse {
  /// Snapshot time in Unix milliseconds.
  #[serde(default)]
  pub timestamp: Option<i64>,
  /// Ask levels, best first.
  #[serde(default)]
  pub asks: Vec<DepthLevel>,
  /// Bid levels, best first.
  #[serde(default)]
  pub bids: Vec<DepthLevel>,
}

impl DepthResponse {
  /// True when both sides of the book are empty.
  pub fn is_empty(&self) -> bool {
    self.asks.is_empty() && self.bids.is_empty()
  }

  /// Normalize the snapshot into a quote for `market`.
  pub fn to_quote(&self, market: &str, received_at: DateTime<Utc>) -> Quote {
    Quote::from_top_of_book(
      market,
      self.asks.first().map(|l| l.price.as_str()),
      self.bids.first().map(|l| l.price.as_str()),
      observation_time(self.timestamp, received_at),
    )
  }
}
