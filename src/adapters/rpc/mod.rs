//! RPC Facade - `rates.RatesService` over HTTP/JSON
//!
//! The inbound boundary of the service. Validates requests, maps
//! use-case results to wire messages and status codes, and serves
//! them with axum.
//!
//! Sub-modules:
//! - `handler`: Validation, deadlines, and result mapping
//! - `server`: axum routes and server lifecycle
//! - `status`: Client-facing status codes
//! - `types`: Request/response wire messages
//! - `validation`: Request validation rules

pub mod handler;
pub mod server;
pub mod status;
pub mod types;
pub mod validation;

pub use handler::RatesHandler;
pub use server::{RpcServer, router};
pub use status::{Code, RpcStatus};
