//! Prometheus Metrics Registry - Rate Service Observability
//!
//! Owns a private `prometheus::Registry` (no process-wide default
//! registry) and is handed to the components that record into it.
//! Rendered in text exposition format on the RPC server's `/metrics`.

use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};

/// Centralized Prometheus metrics for the rate service.
///
/// All metrics follow the naming convention `rates_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// RPC calls by method and outcome (`ok`, `invalid_argument`, `internal`, ...).
    pub requests: IntCounterVec,
    /// Upstream depth fetch latency in seconds, by outcome.
    pub upstream_fetch_seconds: HistogramVec,
    /// Store writes that failed and were swallowed by `get_rates`.
    pub store_write_failures: IntCounter,
    /// Last health check result (1 = healthy, 0 = unhealthy).
    pub health_status: Gauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("rates_requests_total", "RPC requests by method and outcome"),
            &["method", "outcome"],
        )?;

        let upstream_fetch_seconds = HistogramVec::new(
            HistogramOpts::new(
                "rates_upstream_fetch_seconds",
                "Latency of exchange depth fetches in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["outcome"],
        )?;

        let store_write_failures = IntCounter::new(
            "rates_store_write_failures_total",
            "Rate log writes that failed after a successful fetch",
        )?;

        let health_status = Gauge::new(
            "rates_health_status",
            "Result of the last health check (1=healthy, 0=unhealthy)",
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(upstream_fetch_seconds.clone()))?;
        registry.register(Box::new(store_write_failures.clone()))?;
        registry.register(Box::new(health_status.clone()))?;

        Ok(Self {
            registry,
            requests,
            upstream_fetch_seconds,
            store_write_failures,
            health_status,
        })
    }

    /// Count one RPC call.
    pub fn record_request(&self, method: &str, outcome: &str) {
        self.requests.with_label_values(&[method, outcome]).inc();
    }

    /// Encode every registered metric in Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_recorded_metrics() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.record_request("GetRates", "ok");
        metrics.store_write_failures.inc();
        metrics.health_status.set(1.0);

        let text = metrics.render().unwrap();
        assert!(text.contains("rates_requests_total{method=\"GetRates\",outcome=\"ok\"} 1"));
        assert!(text.contains("rates_store_write_failures_total 1"));
        assert!(text.contains("rates_health_status 1"));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = MetricsRegistry::new().unwrap();
        let b = MetricsRegistry::new().unwrap();
        a.store_write_failures.inc();
        assert_eq!(a.store_write_failures.get(), 1);
        assert_eq!(b.store_write_failures.get(), 0);
    }
}
