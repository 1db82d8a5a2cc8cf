//! Persistence Adapters - Rate Log Storage
//!
//! Implements the `QuoteStore` port on Postgres (production) and on
//! process memory (local runs and tests). Both follow the same
//! ordering rules: newest `created_at` first, ties broken by id.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryQuoteStore;
pub use postgres::{PgQuoteStore, PgStoreConfig};
