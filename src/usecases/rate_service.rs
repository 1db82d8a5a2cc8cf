//! Rate Service - Quote Acquisition and Persistence Orchestrator
//!
//! Coordinates the quote source and the rate log:
//! - `get_rates`: fetch from the exchange, then append to the log
//! - `get_latest_rate` / `get_rates_history`: read the log only
//! - `health_check`: store is a hard dependency, exchange a soft one
//!
//! Write-path policy: once a quote has been fetched, a failure to
//! append it is logged and counted, then dropped. The caller still
//! gets the quote.
//!
//! No retries, no per-market locking: concurrent calls for the same
//! market race and each appends its own row.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::domain::quote::{Quote, StoredRate};
use crate::ports::quote_source::QuoteSource;
use crate::ports::quote_store::{QuoteStore, StoreError};
use crate::ports::rates::{RateServiceError, RatesApi};

/// Upper bound on each step of `health_check` (store ping, exchange
/// probe), independent of the configured fetch timeout.
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Market probed by `health_check` unless configured otherwise.
pub const DEFAULT_HEALTH_MARKET: &str = "usdtrub";

/// Rate orchestrator over a quote source and a rate log.
pub struct RateService {
  /// Exchange quote source.
  source: Arc<dyn QuoteSource>,
  /// Append-only rate log.
  store: Arc<dyn QuoteStore>,
  /// Injected metrics handle.
  metrics: Arc<MetricsRegistry>,
  /// Market fetched by the health probe.
  health_market: String,
  /// Bound on the health probe.
  health_probe_timeout: Duration,
}

impl RateService {
  /// Create a new rate service.
  pub fn new(
    source: Arc<dyn QuoteSource>,
    store: Arc<dyn QuoteStore>,
    metrics: Arc<MetricsRegistry>,
  ) -> Self {
    Self {
      source,
      store,
      metrics,
      health_market: DEFAULT_HEALTH_MARKET.to_string(),
      health_probe_timeout: HEALTH_PROBE_TIMEOUT,
    }
  }

  /// Use a different market for the health probe.
  #[must_use]
  pub fn with_health_market(mut self, market: impl Into<String>) -> Self {
    self.health_market = market.into();
    self
  }

  /// Override the per-step health check bound (tests use a short one).
  #[must_use]
  pub fn with_health_probe_timeout(mut self, timeout: Duration) -> Self {
    self.health_probe_timeout = timeout;
    self
  }

  fn observe_fetch(&self, started: Instant, outcome: &str) {
    self
      .metrics
      .upstream_fetch_seconds
      .with_label_values(&[outcome])
      .observe(started.elapsed().as_secs_f64());
  }
}

#[async_trait]
impl RatesApi for RateService {
  /// Fetch a quote and record it.
  ///
  /// A store failure after a successful fetch is swallowed: it is
  /// logged and counted in `rates_store_write_failures_total`, and
  /// the quote is returned as success.
  #[instrument(skip(self))]
  async fn get_rates(&self, market: &str) -> Result<Quote, RateServiceError> {
    info!("Getting rates for market");

    let started = Instant::now();
    let quote = match self.source.fetch(market).await {
      Ok(quote) => {
        self.observe_fetch(started, "ok");
        quote
      }
      Err(e) => {
        self.observe_fetch(started, "error");
        error!(error = %e, "Failed to get rates from Grinex");
        return Err(RateServiceError::Upstream(e));
      }
    };

    if let Err(e) = self
      .store
      .append(&quote.market, &quote.ask, &quote.bid, quote.timestamp)
      .await
    {
      self.metrics.store_write_failures.inc();
      error!(error = %e, "Failed to save rate to database");
    }

    info!(
      ask = %quote.ask,
      bid = %quote.bid,
      "Successfully retrieved and saved rates"
    );

    Ok(quote)
  }

  #[instrument(skip(self))]
  async fn get_latest_rate(
    &self,
    market: &str,
  ) -> Result<Option<StoredRate>, RateServiceError> {
    debug!("Getting latest rate from database");

    self.store.latest(market).await.map_err(|e| {
      error!(error = %e, "Failed to get latest rate from database");
      RateServiceError::Store(e)
    })
  }

  #[instrument(skip(self))]
  async fn get_rates_history(
    &self,
    market: &str,
    limit: u32,
    offset: u32,
  ) -> Result<Vec<StoredRate>, RateServiceError> {
    debug!("Getting rates history from database");

    self.store.query(market, limit, offset).await.map_err(|e| {
      error!(error = %e, "Failed to get rates history from database");
      RateServiceError::Store(e)
    })
  }

  #[instrument(skip(self))]
  async fn health_check(&self) -> Result<(), RateServiceError> {
    debug!("Performing health check");

    let ping = tokio::time::timeout(self.health_probe_timeout, self.store.ping())
      .await
      .unwrap_or_else(|_| Err(StoreError::Connection("database ping timed out".to_string())));
    if let Err(e) = ping {
      self.metrics.health_status.set(0.0);
      error!(error = %e, "Database health check failed");
      return Err(RateServiceError::Store(e));
    }

    match tokio::time::timeout(
      self.health_probe_timeout,
      self.source.fetch(&self.health_market),
    )
    .await
    {
      Ok(Ok(_)) => debug!(market = %self.health_market, "Grinex API reachable"),
      Ok(Err(e)) => warn!(error = %e, "Grinex API health check failed"),
      Err(_) => warn!(
        timeout_ms = self.health_probe_timeout.as_millis(),
        "Grinex API health check timed out"
      ),
    }

    self.metrics.health_status.set(1.0);
    debug!("Health check completed successfully");
    Ok(())
  }
}
