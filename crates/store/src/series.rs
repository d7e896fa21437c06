use crate::fs::{io_error, read_optional, write_atomic};
use async_trait::async_trait;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vigil_core::{Series, sanitize_symbol};
use vigil_ports::{Clock, SeriesStore, StoreError, StoreResult};

/// Daily series persisted as `<data_dir>/<symbol>.json`
///
/// Archive names carry the UTC time of `clock`.
#[derive(Clone)]
pub struct JsonSeriesStore {
    data_dir: PathBuf,
    stale_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonSeriesStore {
    pub fn new(data_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        let data_dir = data_dir.into();
        let stale_dir = data_dir.join("stale");
        Self {
            data_dir,
            stale_dir,
            clock,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn stale_dir(&self) -> &Path {
        &self.stale_dir
    }

    /// Canonical file path for a symbol
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.json", sanitize_symbol(symbol)))
    }
}

#[async_trait]
impl SeriesStore for JsonSeriesStore {
    async fn load(&self, symbol: &str) -> StoreResult<Option<Series>> {
        let path = self.path_for(symbol);
        let Some(content) = read_optional(&path).await? else {
            return Ok(None);
        };

        let series: Series =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if series.is_empty() {
            warn!("[{}] Stored series {} is empty", symbol, path.display());
        }
        Ok(Some(series))
    }

    async fn save(&self, symbol: &str, series: &Series) -> StoreResult<()> {
        let path = self.path_for(symbol);
        let json = serde_json::to_vec_pretty(series)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        write_atomic(&path, &json).await
    }

    async fn archive(&self, symbol: &str) -> StoreResult<bool> {
        let path = self.path_for(symbol);
        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| io_error(&path, e))?
        {
            return Ok(false);
        }

        tokio::fs::create_dir_all(&self.stale_dir)
            .await
            .map_err(|e| io_error(&self.stale_dir, e))?;

        let stamp = self.clock.now().format("%Y%m%d_%H%M%S");
        let mut dest = self
            .stale_dir
            .join(format!("{}_{}.json", sanitize_symbol(symbol), stamp));
        // Two archives within the same second must not overwrite each other
        let mut attempt = 1;
        while tokio::fs::try_exists(&dest)
            .await
            .map_err(|e| io_error(&dest, e))?
        {
            dest = self.stale_dir.join(format!(
                "{}_{}_{}.json",
                sanitize_symbol(symbol),
                stamp,
                attempt
            ));
            attempt += 1;
        }

        tokio::fs::rename(&path, &dest)
            .await
            .map_err(|e| io_error(&path, e))?;
        info!("[{}] Archived {} to {}", symbol, path.display(), dest.display());
        Ok(true)
    }
}
