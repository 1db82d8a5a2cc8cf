//! In-Memory Quote Store - Process-local Rate Log
//!
//! Implements the `QuoteStore` port on a vector guarded by a tokio
//! `RwLock`. Used for local runs without Postgres
//! (`database.backend = "memory"`) and as a real store in tests.
//! Contents are lost on restart.

use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::quote::StoredRate;
use crate::ports::quote_store::{QuoteStore, StoreError};

/// Volatile rate log with the same ordering rules as the Postgres store.
#[derive(Default)]
pub struct InMemoryQuoteStore {
    rows: RwLock<Vec<StoredRate>>,
}

impl InMemoryQuoteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows across all markets.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// True when nothing has been appended yet.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn append(
        &self,
        market: &str,
        ask: &str,
        bid: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let id = rows.last().map_or(1, |r| r.id + 1);
        // Never let a wall-clock step back reorder the log.
        let created_at = rows
            .last()
            .map_or_else(Utc::now, |r| r.created_at.max(Utc::now()));
        rows.push(StoredRate {
            id,
            market: market.to_string(),
            ask: ask.to_string(),
            bid: bid.to_string(),
            timestamp,
            created_at,
        });
        debug!(id, market, "Rate appended");
        Ok(())
    }

    async fn query(
        &self,
        market: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<StoredRate>, StoreError> {
        let rows = self.rows.read().await;
        let mut matching: Vec<&StoredRate> = rows.iter().filter(|r| r.market == market).collect();
        matching.sort_by_key(|r| Reverse((r.created_at, r.id)));

        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn latest(&self, market: &str) -> Result<Option<StoredRate>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|r| r.market == market)
            .max_by_key(|r| (r.created_at, r.id))
            .cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
