//! Exchange Client Tests - Grinex Client against a Local Stub
//!
//! Runs the real reqwest-based client against an axum server bound to
//! an ephemeral port, covering the request shape, the top-of-book
//! selection, and every failure category.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use usdt_rates_service::adapters::exchange::{GrinexClient, GrinexClientConfig};
use usdt_rates_service::adapters::metrics::MetricsRegistry;
use usdt_rates_service::adapters::persistence::InMemoryQuoteStore;
use usdt_rates_service::ports::quote_source::{QuoteSource, SourceError};
use usdt_rates_service::ports::quote_store::QuoteStore;
use usdt_rates_service::ports::rates::{RateServiceError, RatesApi};
use usdt_rates_service::usecases::RateService;

const DEPTH_PATH: &str = "/api/v2/depth";

async fn spawn_stub(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: String, timeout: Duration) -> GrinexClient {
    GrinexClient::new(GrinexClientConfig { base_url, timeout }).unwrap()
}

fn scenario_book() -> Value {
    json!({
        "timestamp": 1_700_000_000_000_i64,
        "asks": [
            {"price": "95.5", "volume": "1000", "amount": "95500", "factor": "1", "type": "limit"},
            {"price": "95.9", "volume": "10", "amount": "959", "factor": "1", "type": "limit"}
        ],
        "bids": [
            {"price": "95.3", "volume": "500", "amount": "47650", "factor": "1", "type": "limit"}
        ]
    })
}

#[tokio::test]
async fn test_fetch_selects_top_of_book() {
    let app = Router::new().route(
        DEPTH_PATH,
        get(|Query(params): Query<HashMap<String, String>>, headers: HeaderMap| async move {
            if params.get("market").map(String::as_str) != Some("usdtrub") {
                return (StatusCode::BAD_REQUEST, Json(json!({})));
            }
            if headers.get("accept").and_then(|v| v.to_str().ok()) != Some("application/json") {
                return (StatusCode::NOT_ACCEPTABLE, Json(json!({})));
            }
            (StatusCode::OK, Json(scenario_book()))
        }),
    );
    let base_url = spawn_stub(app).await;

    let quote = client(base_url, Duration::from_secs(5))
        .fetch("usdtrub")
        .await
        .unwrap();

    assert_eq!(quote.market, "usdtrub");
    assert_eq!(quote.ask, "95.5");
    assert_eq!(quote.bid, "95.3");
    assert_eq!(quote.timestamp.timestamp(), 1_700_000_000);
}

#[tokio::test]
async fn test_fetch_empty_book_yields_sentinels() {
    let app = Router::new().route(
        DEPTH_PATH,
        get(|| async { Json(json!({"timestamp": 0, "asks": [], "bids": []})) }),
    );
    let base_url = spawn_stub(app).await;

    let before = chrono::Utc::now();
    let quote = client(base_url, Duration::from_secs(5))
        .fetch("usdtrub")
        .await
        .unwrap();

    assert_eq!(quote.ask, "N/A");
    assert_eq!(quote.bid, "N/A");
    // Non-positive exchange time falls back to the receive time.
    assert!(quote.timestamp >= before);
}

#[tokio::test]
async fn test_fetch_one_sided_book() {
    let app = Router::new().route(
        DEPTH_PATH,
        get(|| async {
            Json(json!({
                "timestamp": 1_700_000_000_000_i64,
                "asks": [{"price": "95.5", "volume": "1"}],
                "bids": []
            }))
        }),
    );
    let base_url = spawn_stub(app).await;

    let quote = client(base_url, Duration::from_secs(5))
        .fetch("usdtrub")
        .await
        .unwrap();

    assert_eq!(quote.ask, "95.5");
    assert_eq!(quote.bid, "N/A");
}

#[tokio::test]
async fn test_fetch_non_success_status_is_protocol_error() {
    let app = Router::new().route(
        DEPTH_PATH,
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let base_url = spawn_stub(app).await;

    let err = client(base_url, Duration::from_secs(5))
        .fetch("usdtrub")
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Protocol { status: 503 }));
}

#[tokio::test]
async fn test_fetch_malformed_body_is_decode_error() {
    let app = Router::new().route(DEPTH_PATH, get(|| async { "<html>not json</html>" }));
    let base_url = spawn_stub(app).await;

    let err = client(base_url, Duration::from_secs(5))
        .fetch("usdtrub")
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Decode(_)));
}

#[tokio::test]
async fn test_fetch_slow_exchange_is_transport_error() {
    let app = Router::new().route(
        DEPTH_PATH,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(scenario_book())
        }),
    );
    let base_url = spawn_stub(app).await;

    let err = client(base_url, Duration::from_millis(100))
        .fetch("usdtrub")
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Transport(_)));
}

#[tokio::test]
async fn test_fetch_unreachable_exchange_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}"), Duration::from_secs(2))
        .fetch("usdtrub")
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Transport(_)));
}

#[tokio::test]
async fn test_get_rates_end_to_end_persists_scenario_quote() {
    let app = Router::new().route(DEPTH_PATH, get(|| async { Json(scenario_book()) }));
    let base_url = spawn_stub(app).await;

    let store = Arc::new(InMemoryQuoteStore::new());
    let svc = RateService::new(
        Arc::new(client(base_url, Duration::from_secs(5))),
        Arc::clone(&store) as Arc<dyn QuoteStore>,
        Arc::new(MetricsRegistry::new().unwrap()),
    );

    let quote = svc.get_rates("usdtrub").await.unwrap();
    assert_eq!(quote.ask, "95.5");

    let rows = store.query("usdtrub", 10, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].ask, "95.5");
    assert_eq!(rows[0].bid, "95.3");
    assert_eq!(rows[0].timestamp, quote.timestamp);
}

#[tokio::test]
async fn test_get_rates_timeout_appends_nothing() {
    let app = Router::new().route(
        DEPTH_PATH,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(scenario_book())
        }),
    );
    let base_url = spawn_stub(app).await;

    let store = Arc::new(InMemoryQuoteStore::new());
    let svc = RateService::new(
        Arc::new(client(base_url, Duration::from_millis(100))),
        Arc::clone(&store) as Arc<dyn QuoteStore>,
        Arc::new(MetricsRegistry::new().unwrap()),
    );

    let err = svc.get_rates("usdtrub").await.unwrap_err();
    assert!(matches!(
        err,
        RateServiceError::Upstream(SourceError::Transport(_))
    ));
    assert!(store.is_empty().await);
}
