use crate::domain::ports::RankingStore;
use crate::domain::ranking::{RankingEntry, rank};
use crate::error::{RegisterError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Column Family holding one row per finished game.
pub const CF_RANKINGS: &str = "rankings";

/// A persistent ranking table backed by RocksDB.
///
/// Rows are keyed by a big-endian insertion sequence so that iteration returns them in
/// the order they were written. Rows are never rewritten.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    next_key: Arc<AtomicU64>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures the "rankings" column family exists and resumes the insertion sequence
    /// after the last stored row.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_rankings = ColumnFamilyDescriptor::new(CF_RANKINGS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_rankings])?;

        let next_key = {
            let cf = db.cf_handle(CF_RANKINGS).ok_or_else(missing_cf)?;
            match db.iterator_cf(&cf, IteratorMode::End).next() {
                Some(item) => decode_key(&item?.0)? + 1,
                None => 0,
            }
        };

        Ok(Self {
            db: Arc::new(db),
            next_key: Arc::new(AtomicU64::new(next_key)),
        })
    }
}

fn missing_cf() -> RegisterError {
    RegisterError::Internal(Box::new(std::io::Error::other(
        "Rankings column family not found",
    )))
}

fn decode_key(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key.try_into().map_err(|_| {
        RegisterError::Internal(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Malformed ranking key of {} bytes", key.len()),
        )))
    })?;
    Ok(u64::from_be_bytes(bytes))
}

#[async_trait]
impl RankingStore for RocksDBStore {
    async fn record_ranking(&self, entry: RankingEntry) -> Result<()> {
        let cf = self.db.cf_handle(CF_RANKINGS).ok_or_else(missing_cf)?;

        let key = self.next_key.fetch_add(1, Ordering::SeqCst).to_be_bytes();
        let value = serde_json::to_vec(&entry)?;
        self.db.put_cf(&cf, key, value)?;

        Ok(())
    }

    async fn get_rankings(&self, limit: usize) -> Result<Vec<RankingEntry>> {
        let cf = self.db.cf_handle(CF_RANKINGS).ok_or_else(missing_cf)?;

        let mut entries = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let entry: RankingEntry = serde_json::from_slice(&value)?;
            entries.push(entry);
        }

        Ok(rank(entries, limit))
    }
}
