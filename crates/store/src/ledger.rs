use crate::fs::{read_optional, write_atomic};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use vigil_core::{Ledger, sanitize_symbol};
use vigil_ports::{LedgerStore, StoreError, StoreResult};

/// Notification ledger persisted as a single JSON document
#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ledger of `symbol` under `<data_dir>/notifications/`
    pub fn for_symbol(data_dir: impl AsRef<Path>, symbol: &str) -> Self {
        Self::new(
            data_dir
                .as_ref()
                .join("notifications")
                .join(format!("{}.json", sanitize_symbol(symbol))),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LedgerStore for JsonLedgerStore {
    async fn load(&self) -> StoreResult<Ledger> {
        match read_optional(&self.path).await? {
            None => Ok(Ledger::new()),
            Some(content) if content.trim().is_empty() => Ok(Ledger::new()),
            Some(content) => serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn save(&self, ledger: &Ledger) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(ledger)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        write_atomic(&self.path, &json).await
    }
}
