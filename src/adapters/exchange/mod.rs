//! Grinex Exchange Adapter
//!
//! Implements the `QuoteSource` port over the Grinex REST API.
//!
//! Sub-modules:
//! - `client`: HTTP client issuing the depth request
//! - `types`: Depth response types and quote normalization

pub mod client;
pub mod types;

pub use client::{GrinexClient, GrinexClientConfig};
