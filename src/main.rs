//! USDT Rates Service - Entry Point
//!
//! Initializes configuration, logging, the rate log, the exchange
//! client and the RPC server. Runs until SIGINT/SIGTERM.
//!
//! Wiring sequence:
//! 1. Load config.toml (path from RATES_CONFIG) + env overrides + validate
//! 2. Init tracing (JSON or pretty structured logging)
//! 3. Create metrics registry (injected, no global registry)
//! 4. Connect rate log (Postgres pool + schema, or in-memory)
//! 5. Create Grinex client (QuoteSource port)
//! 6. Create RateService orchestrator (RatesApi port)
//! 7. Spawn RPC server (rates.RatesService + /live + /metrics)
//! 8. Wait for SIGINT/SIGTERM → graceful shutdown (drain→close pool→exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use usdt_rates_service::adapters::exchange::GrinexClient;
use usdt_rates_service::adapters::metrics::MetricsRegistry;
use usdt_rates_service::adapters::persistence::{InMemoryQuoteStore, PgQuoteStore};
use usdt_rates_service::adapters::rpc::{RatesHandler, RpcServer};
use usdt_rates_service::config::loader::{CONFIG_PATH_ENV, load_config};
use usdt_rates_service::config::{AppConfig, LogFormat, StoreBackend};
use usdt_rates_service::ports::QuoteStore;
use usdt_rates_service::usecases::RateService;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let config = load_config(&config_path).context("Failed to load configuration")?;

    // ── 2. Initialize structured logging ────────────────────
    init_tracing(&config);

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path,
        backend = ?config.database.backend,
        exchange = %config.exchange.base_url,
        "Starting USDT Rates Service"
    );

    // ── 3. Metrics registry ─────────────────────────────────
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);

    // ── 4. Rate log ─────────────────────────────────────────
    let (store, pg_store): (Arc<dyn QuoteStore>, Option<Arc<PgQuoteStore>>) =
        match config.database.backend {
            StoreBackend::Postgres => {
                let pg = Arc::new(
                    PgQuoteStore::connect(&config.database.pg_config())
                        .await
                        .context("Failed to initialize database")?,
                );
                pg.ensure_schema()
                    .await
                    .context("Failed to prepare rates schema")?;
                (Arc::clone(&pg) as Arc<dyn QuoteStore>, Some(pg))
            }
            StoreBackend::Memory => {
                warn!("In-memory rate log - history is lost on restart");
                (Arc::new(InMemoryQuoteStore::new()) as Arc<dyn QuoteStore>, None)
            }
        };

    // ── 5. Exchange client ──────────────────────────────────
    let source = Arc::new(
        GrinexClient::new(config.exchange.client_config())
            .context("Failed to create Grinex client")?,
    );

    // ── 6. Orchestrator ─────────────────────────────────────
    let service = Arc::new(
        RateService::new(source, store, Arc::clone(&metrics))
            .with_health_market(config.exchange.default_market.clone()),
    );

    // ── 7. RPC server ───────────────────────────────────────
    let handler = Arc::new(
        RatesHandler::new(service, Arc::clone(&metrics), env!("CARGO_PKG_VERSION"))
            .with_deadline(config.server.request_timeout()),
    );
    let server = RpcServer::new(
        handler,
        metrics,
        config.metrics.enabled,
        config.server.bind_address.clone(),
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let server_shutdown = shutdown_tx.subscribe();
    let mut server_handle = tokio::spawn(server.run(server_shutdown));

    // ── 8. Wait for a signal or a server failure ────────────
    tokio::select! {
        () = shutdown_signal() => {
            info!("Received signal, shutting down");
        }
        result = &mut server_handle => {
            match result {
                Ok(Ok(())) => warn!("RPC server exited unexpectedly"),
                Ok(Err(e)) => error!(error = %e, "Server error"),
                Err(e) => error!(error = %e, "RPC server task panicked"),
            }
            close_store(pg_store.as_deref()).await;
            anyhow::bail!("RPC server stopped before shutdown was requested");
        }
    }

    // ── Graceful shutdown ───────────────────────────────────
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(config.server.graceful_timeout(), &mut server_handle).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => error!(error = %e, "Failed to stop RPC server gracefully"),
        Ok(Err(e)) => error!(error = %e, "RPC server task panicked"),
        Err(_) => {
            warn!("Graceful shutdown timeout, forcing stop");
            server_handle.abort();
        }
    }

    close_store(pg_store.as_deref()).await;

    info!("Service stopped");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `service.log_level` when set.
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.service.log_level));

    match config.service.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn close_store(pg_store: Option<&PgQuoteStore>) {
    if let Some(pg) = pg_store {
        pg.close().await;
        info!("Database pool closed");
    }
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
