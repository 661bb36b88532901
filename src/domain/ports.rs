use super::catalog::MenuItem;
use super::ranking::RankingEntry;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn menu_items(&self) -> Result<Vec<MenuItem>>;
}

#[async_trait]
pub trait RankingStore: Send + Sync {
    async fn record_ranking(&self, entry: RankingEntry) -> Result<()>;
    /// Best `limit` entries, highest score first.
    async fn get_rankings(&self, limit: usize) -> Result<Vec<RankingEntry>>;
}

pub type CatalogProviderBox = Box<dyn CatalogProvider>;
pub type RankingStoreBox = Box<dyn RankingStore>;
