//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world, and the one it offers to inbound adapters.
//!
//! Port categories:
//! - `QuoteSource`: Exchange order-book quotes (outbound)
//! - `QuoteStore`: Append-only rate log (outbound)
//! - `RatesApi`: Rate use cases driven by the RPC facade (inbound)

pub mod quote_source;
pub mod quote_store;
pub mod rates;

pub use quote_source::{QuoteSource, SourceError};
pub use quote_store::{QuoteStore, StoreError};
pub use rates::{RateServiceError, RatesApi};
