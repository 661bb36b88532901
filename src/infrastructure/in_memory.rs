use crate::domain::catalog::MenuItem;
use crate::domain::ports::{CatalogProvider, RankingStore};
use crate::domain::ranking::{RankingEntry, rank};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A fixed catalog held in memory, typically loaded once from CSV.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    items: Arc<Vec<MenuItem>>,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self {
            items: Arc::new(items),
        }
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn menu_items(&self) -> Result<Vec<MenuItem>> {
        Ok(self.items.as_ref().clone())
    }
}

/// A thread-safe in-memory ranking table.
///
/// Uses `Arc<RwLock<Vec<RankingEntry>>>`; clones share the same table. Entries are kept
/// in insertion order and only sorted on read.
#[derive(Default, Clone)]
pub struct InMemoryRankingStore {
    entries: Arc<RwLock<Vec<RankingEntry>>>,
}

impl InMemoryRankingStore {
    /// Creates a new, empty ranking store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RankingStore for InMemoryRankingStore {
    async fn record_ranking(&self, entry: RankingEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.push(entry);
        Ok(())
    }

    async fn get_rankings(&self, limit: usize) -> Result<Vec<RankingEntry>> {
        let entries = self.entries.read().await;
        Ok(rank(entries.clone(), limit))
    }
}
