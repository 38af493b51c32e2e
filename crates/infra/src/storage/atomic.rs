//! Crash-safe file writes
//!
//! Every document is written to a sibling `.tmp` file, flushed to disk and
//! renamed over the target, and the parent directory is then flushed so
//! the rename survives a power loss. Readers see either the old or the new
//! contents and never a torn write.

use std::path::{Path, PathBuf};

use diradmin_domain::{DirAdminError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::errors::InfraError;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn storage_error(path: &Path, err: impl Into<InfraError>) -> DirAdminError {
    match DirAdminError::from(err.into()) {
        DirAdminError::Storage(message) | DirAdminError::NotFound(message) => {
            DirAdminError::Storage(format!("{}: {message}", path.display()))
        }
        other => other,
    }
}

/// Replace `path` with `bytes` atomically.
pub async fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| storage_error(parent, e))?;
    }

    let temp = temp_path(path);
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp)
        .await
        .map_err(|e| storage_error(&temp, e))?;

    file.write_all(bytes).await.map_err(|e| storage_error(&temp, e))?;
    file.sync_all().await.map_err(|e| storage_error(&temp, e))?;
    drop(file);

    fs::rename(&temp, path).await.map_err(|e| storage_error(path, e))?;
    sync_parent_dir(path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "file written");
    Ok(())
}

/// Flush the directory entry of `path` so the rename itself is durable.
#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    let dir = fs::File::open(parent).await.map_err(|e| storage_error(parent, e))?;
    dir.sync_all().await.map_err(|e| storage_error(parent, e))
}

// Directories cannot be opened as files outside unix.
#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}

/// Serialize `value` as pretty JSON and replace `path` atomically.
pub async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| storage_error(path, e))?;
    bytes.push(b'\n');
    write_bytes_atomic(path, &bytes).await
}

/// Read a JSON document. A missing file is `Ok(None)`.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(storage_error(path, err)),
    };
    serde_json::from_slice(&bytes).map(Some).map_err(|e| storage_error(path, e))
}

/// Remove a file if it exists.
pub async fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(storage_error(path, err)),
    }
}
