//! Configuration structures
//!
//! Every section carries `#[serde(default)]` so a config file only needs the
//! keys it wants to override.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_BASE_DELAY_MS, DEFAULT_CHECKPOINT_EVERY,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS, DEFAULT_PAGE_SIZE,
    DEFAULT_TOKEN_URL, DEFAULT_USER_AGENT, DEFAULT_WORK_DIR, MAX_PAGE_SIZE,
};

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub retry: RetrySettings,
    pub scan: ScanSettings,
    /// Root of the per-domain working directories
    pub work_dir: PathBuf,
    /// Used when neither `--domain` nor the stored default is set
    pub default_domain: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            retry: RetrySettings::default(),
            scan: ScanSettings::default(),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            default_domain: None,
        }
    }
}

/// Remote API endpoints and transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub token_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ApiConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry bounds for remote calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl RetrySettings {
    pub const fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub const fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Listing and checkpoint cadence for batch runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub page_size: u32,
    pub checkpoint_every: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self { page_size: DEFAULT_PAGE_SIZE, checkpoint_every: DEFAULT_CHECKPOINT_EVERY }
    }
}

/// Clamp a requested page size into the range the directory API accepts.
///
/// Out-of-range requests fall back to the default; a smaller `max_results`
/// shrinks the page so no more entities are fetched than will be used.
pub fn effective_page_size(requested: u32, max_results: Option<u32>) -> u32 {
    let size = if (1..=MAX_PAGE_SIZE).contains(&requested) { requested } else { DEFAULT_PAGE_SIZE };
    match max_results {
        Some(max) if max > 0 && max < size => max,
        _ => size,
    }
}
