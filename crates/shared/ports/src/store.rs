use crate::error::StoreResult;
use async_trait::async_trait;
use vigil_core::{Ledger, Series};

/// Durable per-symbol daily series storage
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Load the persisted series, `None` if nothing has been stored yet
    async fn load(&self, symbol: &str) -> StoreResult<Option<Series>>;

    /// Replace the persisted series as a single atomic write
    async fn save(&self, symbol: &str, series: &Series) -> StoreResult<()>;

    /// Move the persisted series aside. Returns `false` if there was nothing
    /// to archive.
    async fn archive(&self, symbol: &str) -> StoreResult<bool>;
}

/// Durable notification ledger storage
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn load(&self) -> StoreResult<Ledger>;

    async fn save(&self, ledger: &Ledger) -> StoreResult<()>;
}
