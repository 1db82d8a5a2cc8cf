//! Property-Based Tests - Quote Selection and Rate Log Windows
//!
//! Uses `proptest` to verify that top-of-book selection and history
//! pagination hold their invariants across random inputs.

use chrono::{DateTime, Utc};
use proptest::prelude::*;

use usdt_rates_service::adapters::exchange::types::{DepthLevel, DepthResponse};
use usdt_rates_service::adapters::persistence::InMemoryQuoteStore;
use usdt_rates_service::domain::quote::{NO_PRICE, observation_time};
use usdt_rates_service::ports::quote_store::QuoteStore;

fn level(price: &str) -> DepthLevel {
    DepthLevel {
        price: price.to_string(),
        volume: "1".to_string(),
    }
}

fn price_strategy() -> impl Strategy<Value = String> {
    (1u32..100_000, 0u32..100).prop_map(|(whole, frac)| format!("{whole}.{frac:02}"))
}

// ── Top-of-book Selection ───────────────────────────────────

proptest! {
    /// The quote always carries the first level of each side, verbatim.
    #[test]
    fn quote_takes_first_level_verbatim(
        asks in prop::collection::vec(price_strategy(), 1..20),
        bids in prop::collection::vec(price_strategy(), 1..20),
    ) {
        let depth = DepthResponse {
            timestamp: Some(1_700_000_000_000),
            asks: asks.iter().map(|p| level(p)).collect(),
            bids: bids.iter().map(|p| level(p)).collect(),
        };
        let quote = depth.to_quote("usdtrub", Utc::now());
        prop_assert_eq!(&quote.ask, &asks[0]);
        prop_assert_eq!(&quote.bid, &bids[0]);
        prop_assert!(!quote.is_empty_book());
    }

    /// An empty side always yields the sentinel, the other side is untouched.
    #[test]
    fn empty_side_yields_sentinel(
        asks in prop::collection::vec(price_strategy(), 0..5),
        bids in prop::collection::vec(price_strategy(), 0..5),
    ) {
        let depth = DepthResponse {
            timestamp: None,
            asks: asks.iter().map(|p| level(p)).collect(),
            bids: bids.iter().map(|p| level(p)).collect(),
        };
        let quote = depth.to_quote("usdtrub", Utc::now());
        let expected_ask = asks.first().map_or(NO_PRICE, String::as_str);
        let expected_bid = bids.first().map_or(NO_PRICE, String::as_str);
        prop_assert_eq!(quote.ask.as_str(), expected_ask);
        prop_assert_eq!(quote.bid.as_str(), expected_bid);
        prop_assert_eq!(quote.is_empty_book(), asks.is_empty() && bids.is_empty());
    }
}

// ── Observation Time ────────────────────────────────────────

proptest! {
    /// Positive exchange times are truncated to whole seconds.
    #[test]
    fn positive_timestamp_truncates_to_seconds(ms in 1i64..4_102_444_800_000) {
        let received_at = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let ts = observation_time(Some(ms), received_at);
        prop_assert_eq!(ts.timestamp(), ms / 1000);
        prop_assert_eq!(ts.timestamp_subsec_nanos(), 0);
    }

    /// Non-positive exchange times fall back to the receive time.
    #[test]
    fn non_positive_timestamp_falls_back(ms in i64::MIN..=0) {
        let received_at = Utc::now();
        prop_assert_eq!(observation_time(Some(ms), received_at), received_at);
    }
}

// ── Rate Log Pagination ─────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A page holds min(limit, rows - offset) rows, newest first, and
    /// consecutive pages never overlap.
    #[test]
    fn history_window_is_bounded_and_ordered(
        rows in 0usize..30,
        limit in 1u32..15,
        offset in 0u32..40,
    ) {
        let (page, next) = tokio_test::block_on(async {
            let store = InMemoryQuoteStore::new();
            for i in 0..rows {
                store
                    .append("usdtrub", &i.to_string(), "0", Utc::now())
                    .await
                    .unwrap();
            }
            store.append("btcusdt", "1", "1", Utc::now()).await.unwrap();

            let page = store.query("usdtrub", limit, offset).await.unwrap();
            let next = store.query("usdtrub", limit, offset + limit).await.unwrap();
            (page, next)
        });

        let expected = rows.saturating_sub(offset as usize).min(limit as usize);
        prop_assert_eq!(page.len(), expected);
        prop_assert!(page.iter().all(|r| r.market == "usdtrub"));
        prop_assert!(page.windows(2).all(|w| w[0].id > w[1].id));
        if let (Some(last), Some(first_next)) = (page.last(), next.first()) {
            prop_assert!(last.id > first_next.id);
        }
    }
}
