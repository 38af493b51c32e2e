//! Configuration loader
//!
//! ## Loading Strategy
//! 1. An explicit file (`--config`) must exist and parse
//! 2. Otherwise the first file found by [`probe_config_paths`] is used
//! 3. Otherwise built-in defaults
//! 4. Environment overrides are applied last
//!
//! JSON and TOML are supported, detected by file extension.
//!
//! ## Environment Variables
//! - `DIRADMIN_API_BASE_URL`: Directory API base URL
//! - `DIRADMIN_TOKEN_URL`: OAuth2 token endpoint
//! - `DIRADMIN_HTTP_TIMEOUT_SECS`: Transport timeout in seconds
//! - `DIRADMIN_WORK_DIR`: Root of the working directory
//! - `DIRADMIN_DOMAIN`: Default domain
//! - `DIRADMIN_MAX_ATTEMPTS`: Attempts per API call (initial try included)
//! - `DIRADMIN_BASE_DELAY_MS`: First retry delay in milliseconds
//! - `DIRADMIN_MAX_DELAY_MS`: Retry delay cap in milliseconds
//! - `DIRADMIN_PAGE_SIZE`: Users per listing page
//! - `DIRADMIN_CHECKPOINT_EVERY`: Entities between scan checkpoints

use std::path::{Path, PathBuf};
use std::str::FromStr;

use diradmin_domain::{AppConfig, DirAdminError, Result};

use crate::errors::InfraError;

/// Load configuration from `explicit` (or a probed file, or defaults) and
/// apply environment overrides.
///
/// # Errors
/// Returns `DirAdminError::Config` if the explicit file is missing, a file
/// does not parse, or an override has an invalid value.
pub fn load(explicit: Option<PathBuf>) -> Result<AppConfig> {
    let mut config = match explicit {
        Some(path) => load_from_file(&path)?,
        None => match probe_config_paths(&probe_work_dir()) {
            Some(path) => load_from_file(&path)?,
            None => {
                tracing::debug!("no config file found, using defaults");
                AppConfig::default()
            }
        },
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// # Errors
/// Returns `DirAdminError::Config` if the file is missing or invalid.
pub fn load_from_file(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Err(DirAdminError::Config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| DirAdminError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Parse configuration by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DirAdminError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(DirAdminError::Config(format!("Unsupported config format: {extension}"))),
    }
}

fn probe_work_dir() -> PathBuf {
    env_var("DIRADMIN_WORK_DIR").map(PathBuf::from).unwrap_or_else(|| AppConfig::default().work_dir)
}

/// Candidate config files, first existing wins:
/// 1. `./diradmin.toml`
/// 2. `./diradmin.json`
/// 3. `<work_dir>/config.toml`
pub fn probe_config_paths(work_dir: &Path) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("diradmin.toml"));
        candidates.push(cwd.join("diradmin.json"));
    }
    candidates.push(work_dir.join("config.toml"));

    candidates.into_iter().find(|path| path.exists())
}

/// Apply `DIRADMIN_*` overrides on top of `config`.
///
/// # Errors
/// Returns `DirAdminError::Config` when a numeric variable does not parse.
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Some(url) = env_var("DIRADMIN_API_BASE_URL") {
        config.api.base_url = url;
    }
    if let Some(url) = env_var("DIRADMIN_TOKEN_URL") {
        config.api.token_url = url;
    }
    if let Some(secs) = env_parse("DIRADMIN_HTTP_TIMEOUT_SECS")? {
        config.api.timeout_secs = secs;
    }
    if let Some(dir) = env_var("DIRADMIN_WORK_DIR") {
        config.work_dir = PathBuf::from(dir);
    }
    if let Some(domain) = env_var("DIRADMIN_DOMAIN") {
        config.default_domain = Some(domain);
    }
    if let Some(attempts) = env_parse("DIRADMIN_MAX_ATTEMPTS")? {
        config.retry.max_attempts = attempts;
    }
    if let Some(ms) = env_parse("DIRADMIN_BASE_DELAY_MS")? {
        config.retry.base_delay_ms = ms;
    }
    if let Some(ms) = env_parse("DIRADMIN_MAX_DELAY_MS")? {
        config.retry.max_delay_ms = ms;
    }
    if let Some(size) = env_parse("DIRADMIN_PAGE_SIZE")? {
        config.scan.page_size = size;
    }
    if let Some(every) = env_parse("DIRADMIN_CHECKPOINT_EVERY")? {
        config.scan.checkpoint_every = every;
    }
    Ok(())
}

/// Non-empty environment variable
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse a numeric environment variable
///
/// # Errors
/// Returns `DirAdminError::Config` if the variable is set but invalid.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| DirAdminError::Config(format!("Invalid value for {key} ({raw}): {e}")))
        })
        .transpose()
}
