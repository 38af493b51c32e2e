//! JSON file implementation of [`ScanStore`]

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use diradmin_core::ScanStore;
use diradmin_domain::constants::SCAN_STATE_VERSION;
use diradmin_domain::{DirAdminError, Result, ScanState};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::atomic::{read_json, remove_if_exists, write_json_atomic};

/// Scan state persisted as one JSON document.
///
/// Every save replaces the whole file, so cursor and results are always
/// consistent with each other on disk.
#[derive(Debug, Clone)]
pub struct JsonScanStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonScanStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), _marker: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<T> ScanStore<T> for JsonScanStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load(&self) -> Result<Option<ScanState<T>>> {
        let Some(state) = read_json::<ScanState<T>>(&self.path).await? else {
            debug!(path = %self.path.display(), "no scan state on disk");
            return Ok(None);
        };

        if state.version != SCAN_STATE_VERSION {
            return Err(DirAdminError::Storage(format!(
                "{}: unsupported scan state version {} (expected {SCAN_STATE_VERSION}); rerun with --restart",
                self.path.display(),
                state.version
            )));
        }

        debug!(
            path = %self.path.display(),
            status = %state.status,
            results = state.results.len(),
            "scan state loaded"
        );
        Ok(Some(state))
    }

    async fn save(&self, state: &ScanState<T>) -> Result<()> {
        write_json_atomic(&self.path, state).await
    }

    async fn discard(&self) -> Result<()> {
        info!(path = %self.path.display(), "discarding scan state");
        remove_if_exists(&self.path).await
    }
}

#[cfg(test)]
mod tests {
    use diradmin_domain::ScanStatus;
    use tempfile::TempDir;

    use super::*;

    fn store(dir: &TempDir) -> JsonScanStore<Vec<String>> {
        JsonScanStore::new(dir.path().join("example.com").join("collection_scan.json"))
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saved_state_is_read_back() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut state = ScanState::new("collection", "example.com");
        state.record_success("a@example.com", vec!["twitter.com".to_string()]);
        state.next_page(Some("p2".into()));

        store.save(&state).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();

        assert_eq!(loaded.status, ScanStatus::Running);
        assert_eq!(loaded.cursor.page_token.as_deref(), Some("p2"));
        assert_eq!(loaded.results["a@example.com"], vec!["twitter.com".to_string()]);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn unknown_version_is_refused() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut state: ScanState<Vec<String>> = ScanState::new("collection", "example.com");
        state.version = SCAN_STATE_VERSION + 1;
        store.save(&state).await.unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, DirAdminError::Storage(ref m) if m.contains("--restart")), "{err}");
    }

    #[tokio::test]
    async fn discard_removes_the_file_and_tolerates_absence() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&ScanState::new("collection", "example.com")).await.unwrap();

        store.discard().await.unwrap();
        store.discard().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
