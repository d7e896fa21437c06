//! Shared file helpers

use std::path::Path;
use tokio::io::AsyncWriteExt;
use vigil_ports::{StoreError, StoreResult};

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Write `contents` to `path` through a sibling temp file and a rename, so a
/// reader (or a cancelled writer) never observes a half-written file.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    let mut file = tokio::fs::File::create(&tmp)
        .await
        .map_err(|e| io_error(&tmp, e))?;
    file.write_all(contents)
        .await
        .map_err(|e| io_error(&tmp, e))?;
    file.sync_all().await.map_err(|e| io_error(&tmp, e))?;
    drop(file);

    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| io_error(path, e))
}

/// Read a file, `None` if it does not exist
pub(crate) async fn read_optional(path: &Path) -> StoreResult<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path, e)),
    }
}
