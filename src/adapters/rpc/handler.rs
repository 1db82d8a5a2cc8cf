//! Rates Handler - RPC Facade over the `RatesApi` Port
//!
//! Validates inbound requests, applies the per-request deadline, and
//! maps use-case results onto wire responses and status codes.
//! Transport-agnostic: the axum routes in `server` only decode JSON
//! and delegate here.
//!
//! Mapping rules:
//! - blank market → `INVALID_ARGUMENT`, use case never called
//! - any use-case error → `INTERNAL` with a generic message
//! - deadline expiry → `DEADLINE_EXCEEDED`
//! - undecodable request → `INVALID_ARGUMENT`, use case never called
//! - `Healthcheck` never fails; it reports `unhealthy` instead. It is
//!   not subject to the request deadline: the use case bounds each of
//!   its steps, and only store reachability decides the status.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use super::status::RpcStatus;
use super::types::{
    GetLatestRateRequest, GetLatestRateResponse, GetRatesHistoryRequest,
    GetRatesHistoryResponse, GetRatesRequest, GetRatesResponse, HealthStatus,
    HealthcheckResponse,
};
use super::validation::{history_window, require_market};
use crate::adapters::metrics::MetricsRegistry;
use crate::ports::rates::RatesApi;

/// RPC facade for the rates service.
pub struct RatesHandler {
    /// Use cases behind the facade.
    rates: Arc<dyn RatesApi>,
    /// Injected metrics handle.
    metrics: Arc<MetricsRegistry>,
    /// Version reported by `Healthcheck`.
    version: String,
    /// Per-request deadline; `None` means unbounded.
    deadline: Option<Duration>,
}

impl RatesHandler {
    /// Create a new handler.
    pub fn new(
        rates: Arc<dyn RatesApi>,
        metrics: Arc<MetricsRegistry>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            rates,
            metrics,
            version: version.into(),
            deadline: None,
        }
    }

    /// Bound every call by `deadline`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    async fn within_deadline<T>(&self, call: impl Future<Output = T>) -> Result<T, RpcStatus> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, call)
                .await
                .map_err(|_| RpcStatus::deadline_exceeded()),
            None => Ok(call.await),
        }
    }

    fn record<T>(&self, method: &str, result: Result<T, RpcStatus>) -> Result<T, RpcStatus> {
        let outcome = result.as_ref().map_or_else(|s| s.code.label(), |_| "ok");
        self.metrics.record_request(method, outcome);
        result
    }

    /// `GetRates`: fresh quote from the exchange.
    #[instrument(skip(self, req), fields(market = %req.market))]
    pub async fn get_rates(&self, req: GetRatesRequest) -> Result<GetRatesResponse, RpcStatus> {
        info!("GetRates request received");
        let result = self.get_rates_inner(&req.market).await;
        self.record("GetRates", result)
    }

    async fn get_rates_inner(&self, market: &str) -> Result<GetRatesResponse, RpcStatus> {
        let market = require_market(market).inspect_err(|_| {
            warn!("Empty market in request");
        })?;

        let quote = self
            .within_deadline(self.rates.get_rates(market))
            .await?
            .map_err(|e| {
                error!(error = %e, "Failed to get rates");
                RpcStatus::internal("failed to get rates")
            })?;

        info!(
            ask = %quote.ask,
            bid = %quote.bid,
            "GetRates request completed successfully"
        );
        Ok(quote.into())
    }

    /// `Healthcheck`: never fails, reports `unhealthy` instead.
    #[instrument(skip(self))]
    pub async fn healthcheck(&self) -> HealthcheckResponse {
        debug!("Healthcheck request received");

        let status = match self.rates.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = %e, "Health check failed");
                HealthStatus::Unhealthy
            }
        };

        self.metrics.health_status.set(match status {
            HealthStatus::Healthy => 1.0,
            HealthStatus::Unhealthy => 0.0,
        });
        self.metrics.record_request("Healthcheck", "ok");
        debug!(status = ?status, "Healthcheck request completed");

        HealthcheckResponse {
            status,
            version: self.version.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Reject a request whose body could not be decoded.
    ///
    /// `reason` is logged but not returned to the caller.
    pub fn reject_malformed(&self, method: &str, reason: &str) -> RpcStatus {
        warn!(method, reason, "Malformed request body");
        let status = RpcStatus::invalid_argument("invalid request body");
        self.metrics.record_request(method, status.code.label());
        status
    }

    /// `GetLatestRate`: most recent stored rate, `null` when none.
    #[instrument(skip(self, req), fields(market = %req.market))]
    pub async fn get_latest_rate(
        &self,
        req: GetLatestRateRequest,
    ) -> Result<GetLatestRateResponse, RpcStatus> {
        debug!("GetLatestRate request received");
        let result = self.get_latest_rate_inner(&req.market).await;
        self.record("GetLatestRate", result)
    }

    async fn get_latest_rate_inner(&self, market: &str) -> Result<GetLatestRateResponse, RpcStatus> {
        let market = require_market(market)?;
        let rate = self
            .within_deadline(self.rates.get_latest_rate(market))
            .await?
            .map_err(|e| {
                error!(error = %e, "Failed to get latest rate");
                RpcStatus::internal("failed to get latest rate")
            })?;
        Ok(GetLatestRateResponse { rate })
    }

    /// `GetRatesHistory`: stored rates, newest first.
    #[instrument(skip(self, req), fields(market = %req.market))]
    pub async fn get_rates_history(
        &self,
        req: GetRatesHistoryRequest,
    ) -> Result<GetRatesHistoryResponse, RpcStatus> {
        debug!(limit = ?req.limit, offset = ?req.offset, "GetRatesHistory request received");
        let result = self.get_rates_history_inner(&req).await;
        self.record("GetRatesHistory", result)
    }

    async fn get_rates_history_inner(
        &self,
        req: &GetRatesHistoryRequest,
    ) -> Result<GetRatesHistoryResponse, RpcStatus> {
        let market = require_market(&req.market)?;
        let (limit, offset) = history_window(req.limit, req.offset)?;
        let rates = self
            .within_deadline(self.rates.get_rates_history(market, limit, offset))
            .await?
            .map_err(|e| {
                error!(error = %e, "Failed to get rates history");
                RpcStatus::internal("failed to get rates history")
            })?;
        Ok(GetRatesHistoryResponse { rates })
    }
}
