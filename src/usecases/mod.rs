//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates the quote source and the rate log behind the
//! `RatesApi` port.
//!
//! Use cases:
//! - `RateService`: fetch + persist, history reads, composite health

pub mod rate_service;

pub use rate_service::RateService;
