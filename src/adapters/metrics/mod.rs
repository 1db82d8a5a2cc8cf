//! Metrics Adapters
//!
//! Prometheus metrics recorded by the rate orchestrator and the RPC
//! facade, exported on the RPC server's `/metrics` route.

pub mod prometheus;

pub use prometheus::MetricsRegistry;
