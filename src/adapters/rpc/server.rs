//! RPC Server - axum Routes for the Rates Service
//!
//! Serves the `rates.RatesService` methods as JSON POST endpoints,
//! plus `/live` and (when enabled) `/metrics`. Undecodable bodies are
//! answered with the same `INVALID_ARGUMENT` status body as any other
//! validation failure. Shuts down gracefully on the broadcast shutdown
//! signal, letting in-flight calls finish.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

use super::handler::RatesHandler;
use super::status::RpcStatus;
use super::types::{
    GetLatestRateRequest, GetLatestRateResponse, GetRatesHistoryRequest,
    GetRatesHistoryResponse, GetRatesRequest, GetRatesResponse, HealthcheckResponse,
};
use crate::adapters::metrics::MetricsRegistry;

/// Route of `GetRates`.
pub const GET_RATES_PATH: &str = "/rates.RatesService/GetRates";
/// Route of `Healthcheck`.
pub const HEALTHCHECK_PATH: &str = "/rates.RatesService/Healthcheck";
/// Route of `GetLatestRate`.
pub const GET_LATEST_RATE_PATH: &str = "/rates.RatesService/GetLatestRate";
/// Route of `GetRatesHistory`.
pub const GET_RATES_HISTORY_PATH: &str = "/rates.RatesService/GetRatesHistory";

#[derive(Clone)]
struct AppState {
    handler: Arc<RatesHandler>,
    metrics: Arc<MetricsRegistry>,
}

/// Build the router for the RPC facade.
///
/// `/metrics` is only mounted when `expose_metrics` is set.
pub fn router(
    handler: Arc<RatesHandler>,
    metrics: Arc<MetricsRegistry>,
    expose_metrics: bool,
) -> Router {
    let mut app = Router::new()
        .route(GET_RATES_PATH, post(get_rates))
        .route(HEALTHCHECK_PATH, post(healthcheck))
        .route(GET_LATEST_RATE_PATH, post(get_latest_rate))
        .route(GET_RATES_HISTORY_PATH, post(get_rates_history))
        .route("/live", get(liveness));

    if expose_metrics {
        app = app.route("/metrics", get(render_metrics));
    }

    app.with_state(AppState { handler, metrics })
}

async fn get_rates(
    State(state): State<AppState>,
    body: Result<Json<GetRatesRequest>, JsonRejection>,
) -> Result<Json<GetRatesResponse>, RpcStatus> {
    let Json(req) = decode(&state, "GetRates", body)?;
    state.handler.get_rates(req).await.map(Json)
}

async fn healthcheck(State(state): State<AppState>) -> Json<HealthcheckResponse> {
    Json(state.handler.healthcheck().await)
}

async fn get_latest_rate(
    State(state): State<AppState>,
    body: Result<Json<GetLatestRateRequest>, JsonRejection>,
) -> Result<Json<GetLatestRateResponse>, RpcStatus> {
    let Json(req) = decode(&state, "GetLatestRate", body)?;
    state.handler.get_latest_rate(req).await.map(Json)
}

async fn get_rates_history(
    State(state): State<AppState>,
    body: Result<Json<GetRatesHistoryRequest>, JsonRejection>,
) -> Result<Json<GetRatesHistoryResponse>, RpcStatus> {
    let Json(req) = decode(&state, "GetRatesHistory", body)?;
    state.handler.get_rates_history(req).await.map(Json)
}

/// Turn axum's body rejections into `INVALID_ARGUMENT`.
fn decode<T>(
    state: &AppState,
    method: &str,
    body: Result<Json<T>, JsonRejection>,
) -> Result<Json<T>, RpcStatus> {
    body.map_err(|rejection| state.handler.reject_malformed(method, &rejection.body_text()))
}

/// Liveness probe: 200 while the process is running.
async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}

/// RPC server bound to a configured address.
pub struct RpcServer {
    /// Assembled router.
    app: Router,
    /// Bind address, e.g. `0.0.0.0:8080`.
    bind_address: String,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(
        handler: Arc<RatesHandler>,
        metrics: Arc<MetricsRegistry>,
        expose_metrics: bool,
        bind_address: impl Into<String>,
    ) -> Self {
        Self {
            app: router(handler, metrics, expose_metrics),
            bind_address: bind_address.into(),
        }
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let listener = TcpListener::bind(&self.bind_address)
            .await
            .with_context(|| format!("Failed to bind {}", self.bind_address))?;
        self.serve(listener, shutdown_rx).await
    }

    /// Serve on an already bound listener until shutdown.
    #[instrument(skip_all)]
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let address = listener.local_addr().context("Listener has no address")?;
        info!(address = %address, "Starting RPC server");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await
            .context("RPC server failed")?;

        info!("RPC server stopped gracefully");
        Ok(())
    }
}
