//! Quote Source Port - Exchange Price Interface
//!
//! Defines the trait the rate orchestrator uses to obtain a fresh
//! quote from an external exchange. A single call is a single
//! attempt: implementors must not retry.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::quote::Quote;

/// Failures of a single quote fetch.
#[derive(Debug, Error)]
pub enum SourceError {
  /// Connection failure, timeout, or body read failure.
  #[error("transport error: {0}")]
  Transport(String),
  /// The exchange answered with a non-success status.
  #[error("unexpected status code: {status}")]
  Protocol {
    /// HTTP status code returned by the exchange.
    status: u16,
  },
  /// The response body was not a valid depth document.
  #[error("failed to decode depth response: {0}")]
  Decode(String),
}

/// Trait for exchange quote providers.
///
/// `market` is passed through to the exchange as-is; format
/// validation is the caller's concern.
#[async_trait]
pub trait QuoteSource: Send + Sync + 'static {
  /// Fetch the current best ask / best bid for `market`.
  async fn fetch(&self, market: &str) -> Result<Quote, SourceError>;
}
