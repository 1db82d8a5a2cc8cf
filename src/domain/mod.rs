//! Domain layer - Core quote model.
//!
//! Pure types and normalization rules with no I/O (hexagonal
//! architecture inner ring). Everything here is testable in isolation.

pub mod quote;

pub use quote::{MarketId, NO_PRICE, Quote, StoredRate, observation_time};
