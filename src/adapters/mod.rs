//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP client, Postgres, axum server).
//! Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `exchange`: Grinex depth API client (`QuoteSource`)
//! - `metrics`: Prometheus metrics registry
//! - `persistence`: Postgres and in-memory rate logs (`QuoteStore`)
//! - `rpc`: HTTP/JSON RPC facade driving `RatesApi`

pub mod exchange;
pub mod metrics;
pub mod persistence;
pub mod rpc;
