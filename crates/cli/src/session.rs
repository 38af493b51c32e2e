//! Per-invocation session: resolved domain, work dir and an authorized
//! API client

use std::sync::Arc;

use diradmin_common::validate_domain;
use diradmin_core::{ScanOptions, UserService};
use diradmin_domain::{AppConfig, DirAdminError, Result};
use diradmin_infra::api::AccessTokenProvider;
use diradmin_infra::{
    ApiClient, ApiClientConfig, HttpClient, RefreshingTokenProvider, StaticTokenProvider, WorkDir,
};
use tracing::{debug, info};

/// Everything a command needs to talk to one domain.
pub struct Session {
    pub domain: String,
    pub work: WorkDir,
    pub config: AppConfig,
    pub api: Arc<ApiClient>,
}

impl Session {
    /// Build a session for an already resolved `domain`.
    ///
    /// # Errors
    /// Fails on an invalid domain, missing credentials or a bad retry
    /// configuration.
    pub async fn open(config: AppConfig, domain: &str) -> Result<Self> {
        let domain = checked_domain(domain)?;
        let work = WorkDir::new(&config.work_dir);
        work.ensure_root().await?;

        let auth = token_provider(&config, &work, &domain).await?;
        let api = ApiClient::new(ApiClientConfig::from_app_config(&config)?, auth)?;
        info!(domain = %domain, base_url = %api.base_url(), "session opened");

        Ok(Self { domain, work, config, api: Arc::new(api) })
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.api.clone())
    }

    /// Scan options for this domain with the configured page size and
    /// checkpoint interval.
    pub fn scan_options(&self, scan: impl Into<String>) -> ScanOptions {
        ScanOptions::new(scan, self.domain.as_str())
            .with_page_size(self.config.scan.page_size)
            .with_checkpoint_every(self.config.scan.checkpoint_every)
    }
}

/// Domain to operate on: `--domain`, else the stored default, else the
/// configured default.
///
/// # Errors
/// Returns `InvalidInput` when none of them is set.
pub async fn resolve_domain(
    explicit: Option<&str>,
    work: &WorkDir,
    config: &AppConfig,
) -> Result<String> {
    if let Some(domain) = explicit {
        return checked_domain(domain);
    }
    if let Some(defaults) = work.load_default_domain().await? {
        debug!(domain = %defaults.domain, "using stored default domain");
        return checked_domain(&defaults.domain);
    }
    match config.default_domain.as_deref() {
        Some(domain) => checked_domain(domain),
        None => Err(DirAdminError::InvalidInput(
            "no domain given; pass --domain or run set-default-domain".into(),
        )),
    }
}

fn checked_domain(domain: &str) -> Result<String> {
    validate_domain(domain)
        .map(str::to_string)
        .map_err(|e| DirAdminError::InvalidInput(e.to_string()))
}

async fn token_provider(
    config: &AppConfig,
    work: &WorkDir,
    domain: &str,
) -> Result<Arc<dyn AccessTokenProvider>> {
    if let Some(provider) = StaticTokenProvider::from_env() {
        debug!("using access token from the environment");
        return Ok(Arc::new(provider));
    }

    let http = HttpClient::builder()
        .timeout(config.api.timeout())
        .user_agent(config.api.user_agent.as_str())
        .build()?;
    let provider = RefreshingTokenProvider::load(
        http,
        config.api.token_url.as_str(),
        &work.client_secrets_path(),
        &work.credentials_path(domain),
    )
    .await?;
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use diradmin_infra::DomainDefaults;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn explicit_domain_wins_over_stored_default() {
        let dir = TempDir::new().unwrap();
        let work = WorkDir::new(dir.path());
        let defaults = DomainDefaults { domain: "stored.com".into(), customer_id: None };
        work.save_default_domain(&defaults, false).await.unwrap();

        let config = AppConfig::default();
        assert_eq!(resolve_domain(Some("given.com"), &work, &config).await.unwrap(), "given.com");
        assert_eq!(resolve_domain(None, &work, &config).await.unwrap(), "stored.com");
    }

    #[tokio::test]
    async fn configured_domain_is_the_last_resort() {
        let dir = TempDir::new().unwrap();
        let work = WorkDir::new(dir.path());
        let mut config = AppConfig::default();

        let missing = resolve_domain(None, &work, &config).await;
        assert!(matches!(missing, Err(DirAdminError::InvalidInput(_))));

        config.default_domain = Some("configured.com".into());
        assert_eq!(resolve_domain(None, &work, &config).await.unwrap(), "configured.com");
    }

    #[tokio::test]
    async fn malformed_domain_is_rejected() {
        let dir = TempDir::new().unwrap();
        let work = WorkDir::new(dir.path());
        let result = resolve_domain(Some("not a domain"), &work, &AppConfig::default()).await;
        assert!(matches!(result, Err(DirAdminError::InvalidInput(_))));
    }
}
