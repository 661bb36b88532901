use crate::domain::money::Yen;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("Catalog is empty, no order can be drawn")]
    EmptyCatalog,
    #[error("Invalid bill amount: {0}")]
    InvalidBillAmount(i64),
    #[error("Invalid order subtotal: {0}")]
    InvalidSubtotal(i64),
    #[error("Invalid error rate: {0} (expected a value in 0..=1)")]
    InvalidErrorRate(f64),
    #[error("Wallet holds {available} but {required} is due")]
    InsufficientWallet { required: Yen, available: Yen },
    #[error("Wallet value does not fit in a yen amount")]
    WalletOverflow,
    #[error("Invalid menu item: {0}")]
    InvalidMenuItem(String),
    #[error("Unknown menu item: {0}")]
    UnknownItem(String),
    #[error("Item not in operator order: {0}")]
    ItemNotInOrder(String),
    #[error("{0} is not a denomination")]
    InvalidDenomination(Yen),
    #[error("No round in progress")]
    NoActiveRound,
    #[error("Unrecognised command: {0}")]
    InvalidCommand(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, RegisterError>;
