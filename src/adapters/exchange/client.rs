//! Grinex HTTP Client - Depth Snapshot Quote Source
//!
//! Wraps reqwest to implement the `QuoteSource` port against the
//! Grinex REST API. One GET per fetch, bounded by the configured
//! timeout. No retries and no rate limiting: a failed call is
//! reported to the caller as-is.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, error, info, instrument, warn};

use super::types::DepthResponse;
use crate::domain::quote::Quote;
use crate::ports::quote_source::{QuoteSource, SourceError};

/// Configuration for the Grinex HTTP client.
#[derive(Debug, Clone)]
pub struct GrinexClientConfig {
  /// Base URL for the exchange API.
  pub base_url: String,
  /// Per-request timeout.
  pub timeout: Duration,
}

impl Default for GrinexClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://grinex.io".to_string(),
      timeout: Duration::from_secs(10),
    }
  }
}

/// Quote source backed by the Grinex depth endpoint.
pub struct GrinexClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: GrinexClientConfig,
}

impl GrinexClient {
  /// Create a new Grinex client.
  pub fn new(config: GrinexClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self { http, config })
  }

  fn depth_url(&self) -> String {
    format!("{}/api/v2/depth", self.config.base_url.trim_end_matches('/'))
  }
}

#[async_trait]
impl QuoteSource for GrinexClient {
  #[instrument(skip(self))]
  async fn fetch(&self, market: &str) -> Result<Quote, SourceError> {
    let url = self.depth_url();
    debug!(url = %url, market, "Making request to Grinex API");

    let response = self
      .http
      .get(&url)
      .query(&[("market", market)])
      .header(ACCEPT, "application/json")
      .send()
      .await
      .map_err(|e| {
        error!(error = %e, timeout = e.is_timeout(), "Failed to make request");
        SourceError::Transport(e.to_string())
      })?;

    let status = response.status();
    if !status.is_success() {
      error!(status = status.as_u16(), "Unexpected status code");
      return Err(SourceError::Protocol {
        status: status.as_u16(),
      });
    }

    let body = response.bytes().await.map_err(|e| {
      error!(error = %e, "Failed to read response body");
      SourceError::Transport(e.to_string())
    })?;
    let received_at = Utc::now();

    let depth: DepthResponse = serde_json::from_slice(&body).map_err(|e| {
      error!(error = %e, "Failed to decode response");
      SourceError::Decode(e.to_string())
    })?;

    if depth.is_empty() {
      warn!(market, "Empty asks and bids in response");
    }

    let quote = depth.to_quote(market, received_at);

    info!(
      ask = %quote.ask,
      bid = %quote.bid,
      timestamp = %quote.timestamp,
      "Successfully retrieved rates"
    );

    Ok(quote)
  }
}
