//! Working directory layout
//!
//! ```text
//! <root>/
//!   client_secrets.json
//!   default_domain.json
//!   diradmin.log
//!   <domain>/
//!     credentials.json
//!     users.json
//!     <scan>_scan.json
//!     top_client_ids.csv
//!     top_scopes.csv
//! ```

use std::path::{Path, PathBuf};

use diradmin_core::Blacklists;
use diradmin_domain::constants::{
    CLIENT_SECRETS_FILE, CREDENTIALS_FILE, DEFAULT_DOMAIN_FILE, LOG_FILE_NAME, USERS_FILE,
};
use diradmin_domain::{DirAdminError, Result, UserSummary};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use super::atomic::{read_json, write_bytes_atomic, write_json_atomic};
use super::scan_store::JsonScanStore;
use crate::errors::InfraError;

/// Contents of `default_domain.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDefaults {
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

/// Root of all files the toolkit reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn domain_dir(&self, domain: &str) -> PathBuf {
        self.root.join(domain)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILE_NAME)
    }

    pub fn client_secrets_path(&self) -> PathBuf {
        self.root.join(CLIENT_SECRETS_FILE)
    }

    pub fn credentials_path(&self, domain: &str) -> PathBuf {
        self.domain_dir(domain).join(CREDENTIALS_FILE)
    }

    pub fn default_domain_path(&self) -> PathBuf {
        self.root.join(DEFAULT_DOMAIN_FILE)
    }

    pub fn users_path(&self, domain: &str) -> PathBuf {
        self.domain_dir(domain).join(USERS_FILE)
    }

    pub fn scan_path(&self, domain: &str, scan: &str) -> PathBuf {
        self.domain_dir(domain).join(format!("{scan}_scan.json"))
    }

    pub fn report_path(&self, domain: &str, file_name: &str) -> PathBuf {
        self.domain_dir(domain).join(file_name)
    }

    pub fn scan_store<T>(&self, domain: &str, scan: &str) -> JsonScanStore<T> {
        JsonScanStore::new(self.scan_path(domain, scan))
    }

    /// Create the root directory if needed.
    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| DirAdminError::from(InfraError::from(e)))
    }

    /// Refuse to replace an existing file unless `overwrite` is set.
    pub fn check_overwrite(path: &Path, overwrite: bool) -> Result<()> {
        if !overwrite && path.exists() {
            return Err(DirAdminError::AlreadyExists(format!(
                "{} exists; use --force to overwrite",
                path.display()
            )));
        }
        Ok(())
    }

    pub async fn load_default_domain(&self) -> Result<Option<DomainDefaults>> {
        read_json(&self.default_domain_path()).await
    }

    pub async fn save_default_domain(&self, defaults: &DomainDefaults, overwrite: bool) -> Result<PathBuf> {
        let path = self.default_domain_path();
        Self::check_overwrite(&path, overwrite)?;
        write_json_atomic(&path, defaults).await?;
        info!(domain = %defaults.domain, path = %path.display(), "default domain stored");
        Ok(path)
    }

    pub async fn load_users(&self, domain: &str) -> Result<Option<Vec<UserSummary>>> {
        read_json(&self.users_path(domain)).await
    }

    pub async fn save_users(&self, domain: &str, users: &[UserSummary], overwrite: bool) -> Result<PathBuf> {
        let path = self.users_path(domain);
        Self::check_overwrite(&path, overwrite)?;
        write_json_atomic(&path, users).await?;
        info!(domain, users = users.len(), path = %path.display(), "users list written");
        Ok(path)
    }

    /// Entries of a blacklist file. A missing file is an empty list.
    pub async fn read_blacklist(path: &Path) -> Result<Vec<String>> {
        match fs::read_to_string(path).await {
            Ok(text) => Ok(Blacklists::parse_lines(&text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "blacklist file not found, treating as empty");
                Ok(Vec::new())
            }
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    /// Write `header` and `rows` as CSV.
    pub async fn write_csv<R, F>(path: &Path, header: &[&str], rows: R, overwrite: bool) -> Result<()>
    where
        R: IntoIterator<Item = Vec<F>>,
        F: AsRef<str>,
    {
        Self::check_overwrite(path, overwrite)?;
        let mut out = csv_line(header.iter().copied());
        let mut count = 0usize;
        for row in rows {
            out.push_str(&csv_line(row.iter().map(AsRef::as_ref)));
            count += 1;
        }
        write_bytes_atomic(path, out.as_bytes()).await?;
        info!(path = %path.display(), rows = count, "csv report written");
        Ok(())
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut line = fields.map(csv_field).collect::<Vec<_>>().join(",");
    line.push_str("\r\n");
    line
}
