//! Quote domain types.
//!
//! A `Quote` is the best ask / best bid pair observed for one market at one
//! instant. A `StoredRate` is a quote after it has been appended to the rate
//! log. Prices stay exchange-formatted strings end to end: they are never
//! parsed into floats, so no precision is lost between the exchange and the
//! caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel price used when a side of the book is empty.
pub const NO_PRICE: &str = "N/A";

/// Exchange market code, e.g. `usdtrub`.
pub type MarketId = String;

/// Best ask / best bid observed for a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Market the quote was requested for.
    pub market: MarketId,
    /// Best ask price, or [`NO_PRICE`].
    pub ask: String,
    /// Best bid price, or [`NO_PRICE`].
    pub bid: String,
    /// Observation time (exchange-supplied when available).
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Build a quote from the top level of each book side.
    ///
    /// `best_ask` / `best_bid` are the price strings of the first level on
    /// each side, if that side has any level at all. A missing or empty
    /// price falls back to [`NO_PRICE`].
    pub fn from_top_of_book(
        market: impl Into<MarketId>,
        best_ask: Option<&str>,
        best_bid: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            market: market.into(),
            ask: price_or_sentinel(best_ask),
            bid: price_or_sentinel(best_bid),
            timestamp,
        }
    }

    /// True when neither side of the book carried a price.
    pub fn is_empty_book(&self) -> bool {
        self.ask == NO_PRICE && self.bid == NO_PRICE
    }
}

/// A quote that has been appended to the rate log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRate {
    /// Store-assigned, monotonically increasing identifier.
    pub id: i64,
    pub market: MarketId,
    pub ask: String,
    pub bid: String,
    /// Observation time carried over from the quote.
    pub timestamp: DateTime<Utc>,
    /// Time the row was written, assigned by the store.
    pub created_at: DateTime<Utc>,
}

fn price_or_sentinel(price: Option<&str>) -> String {
    match price {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => NO_PRICE.to_string(),
    }
}

/// Resolve the observation instant of a depth snapshot.
///
/// A positive millisecond timestamp is truncated to whole seconds; anything
/// else (absent, zero, negative, out of range) falls back to `received_at`.
pub fn observation_time(timestamp_ms: Option<i64>, received_at: DateTime<Utc>) -> DateTime<Utc> {
    timestamp_ms
        .filter(|ms| *ms > 0)
        .and_then(|ms| DateTime::from_timestamp(ms / 1000, 0))
        .unwrap_or(received_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_top_of_book_prices_are_kept_verbatim() {
        let ts = Utc::now();
        let quote = Quote::from_top_of_book("usdtrub", Some("95.50"), Some("95.30"), ts);
        assert_eq!(quote.ask, "95.50");
        assert_eq!(quote.bid, "95.30");
        assert_eq!(quote.market, "usdtrub");
        assert!(!quote.is_empty_book());
    }

    #[test]
    fn test_missing_sides_use_sentinel() {
        let quote = Quote::from_top_of_book("usdtrub", None, None, Utc::now());
        assert_eq!(quote.ask, NO_PRICE);
        assert_eq!(quote.bid, NO_PRICE);
        assert!(quote.is_empty_book());
    }

    #[test]
    fn test_empty_price_string_uses_sentinel() {
        let quote = Quote::from_top_of_book("usdtrub", Some(""), Some("95.3"), Utc::now());
        assert_eq!(quote.ask, NO_PRICE);
        assert_eq!(quote.bid, "95.3");
    }

    #[test]
    fn test_observation_time_truncates_to_seconds() {
        let now = Utc::now();
        let ts = observation_time(Some(1_700_000_000_999), now);
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap());
    }

    #[test]
    fn test_observation_time_falls_back_to_receipt() {
        let now = Utc::now();
        assert_eq!(observation_time(None, now), now);
        assert_eq!(observation_time(Some(0), now), now);
        assert_eq!(observation_time(Some(-5), now), now);
    }
}
