//! Access tokens for the directory API
//!
//! Two providers:
//! - [`StaticTokenProvider`]: a bearer token supplied from outside
//!   (`DIRADMIN_ACCESS_TOKEN`).
//! - [`RefreshingTokenProvider`]: stored credentials (`credentials.json`)
//!   refreshed through the OAuth2 token endpoint with the installed-app
//!   client secrets, and written back after each refresh.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use diradmin_domain::constants::TOKEN_REFRESH_THRESHOLD_SECS;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::errors::ApiError;
use crate::http::HttpClient;
use crate::storage::{read_json, write_json_atomic};

/// Environment variable holding a ready-made bearer token.
pub const ACCESS_TOKEN_ENV: &str = "DIRADMIN_ACCESS_TOKEN";

/// Trait for providing access tokens
///
/// Called before every request attempt so a provider can refresh between
/// retries.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, ApiError>;
}

/// Fixed bearer token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    /// Token from [`ACCESS_TOKEN_ENV`], if set and non-empty.
    pub fn from_env() -> Option<Self> {
        std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(Self::new)
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, ApiError> {
        Ok(self.token.clone())
    }
}

/// Token set kept in `credentials.json`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl StoredCredentials {
    /// True when the access token expires within the refresh threshold.
    /// Tokens without an expiry are treated as valid.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                expires_at - now <= ChronoDuration::seconds(TOKEN_REFRESH_THRESHOLD_SECS)
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// OAuth client id and secret from `client_secrets.json`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Deserialize)]
struct SecretsFile {
    #[serde(default)]
    installed: Option<ClientSecrets>,
    #[serde(default)]
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Accepts the `{"installed": {...}}` and `{"web": {...}}` layouts as
    /// well as a flat object.
    pub fn from_json(text: &str) -> Result<Self, ApiError> {
        let invalid = |err: serde_json::Error| ApiError::Config(format!("invalid client secrets: {err}"));
        let wrapped: SecretsFile = serde_json::from_str(text).map_err(invalid)?;
        match wrapped.installed.or(wrapped.web) {
            Some(secrets) => Ok(secrets),
            None => serde_json::from_str(text).map_err(invalid),
        }
    }

    pub async fn load(path: &Path) -> Result<Self, ApiError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|err| {
            ApiError::Config(format!("cannot read client secrets {}: {err}", path.display()))
        })?;
        Self::from_json(&text)
    }
}

impl std::fmt::Debug for ClientSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Stored credentials refreshed on demand.
pub struct RefreshingTokenProvider {
    http: HttpClient,
    token_url: String,
    secrets: ClientSecrets,
    credentials_path: PathBuf,
    state: Mutex<StoredCredentials>,
}

impl RefreshingTokenProvider {
    pub fn new(
        http: HttpClient,
        token_url: impl Into<String>,
        secrets: ClientSecrets,
        credentials_path: impl Into<PathBuf>,
        credentials: StoredCredentials,
    ) -> Self {
        let token_url = secrets.token_uri.clone().unwrap_or_else(|| token_url.into());
        Self {
            http,
            token_url,
            secrets,
            credentials_path: credentials_path.into(),
            state: Mutex::new(credentials),
        }
    }

    /// Load `credentials.json` and the client secrets from disk.
    pub async fn load(
        http: HttpClient,
        token_url: impl Into<String>,
        secrets_path: &Path,
        credentials_path: &Path,
    ) -> Result<Self, ApiError> {
        let credentials: StoredCredentials = read_json(credentials_path)
            .await
            .map_err(|err| ApiError::Auth(err.to_string()))?
            .ok_or_else(|| {
                ApiError::Auth(format!(
                    "no stored credentials at {}; set {ACCESS_TOKEN_ENV} or authorize this domain first",
                    credentials_path.display()
                ))
            })?;
        let secrets = ClientSecrets::load(secrets_path).await?;
        debug!(path = %credentials_path.display(), "stored credentials loaded");
        Ok(Self::new(http, token_url, secrets, credentials_path, credentials))
    }

    #[instrument(skip_all, fields(token_url = %self.token_url))]
    async fn refresh(&self, current: &StoredCredentials) -> Result<StoredCredentials, ApiError> {
        let refresh_token = current.refresh_token.clone().ok_or_else(|| {
            ApiError::Auth("access token expired and no refresh token is stored".into())
        })?;

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
        ];
        let response =
            self.http.send(self.http.request(Method::POST, &self.token_url).form(&form)).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "token refresh rejected");
            return Err(match status.as_u16() {
                400 | 401 => ApiError::Auth(format!("token refresh failed ({status}): {body}")),
                _ => ApiError::from_status(status, format!("token refresh failed: {body}"), None),
            });
        }

        let token: TokenResponse =
            response.json().await.map_err(|err| ApiError::Decode(err.to_string()))?;
        let refreshed = StoredCredentials {
            access_token: token.access_token,
            refresh_token: token.refresh_token.or(Some(refresh_token)),
            expires_at: token.expires_in.map(|secs| Utc::now() + ChronoDuration::seconds(secs)),
            token_type: token.token_type.unwrap_or_else(default_token_type),
            scope: token.scope.or_else(|| current.scope.clone()),
        };

        write_json_atomic(&self.credentials_path, &refreshed)
            .await
            .map_err(|err| ApiError::Config(err.to_string()))?;
        info!(expires_at = ?refreshed.expires_at, "access token refreshed");
        Ok(refreshed)
    }
}

#[async_trait]
impl AccessTokenProvider for RefreshingTokenProvider {
    async fn access_token(&self) -> Result<String, ApiError> {
        let mut state = self.state.lock().await;
        if state.needs_refresh(Utc::now()) {
            let refreshed = self.refresh(&state).await?;
            *state = refreshed;
        }
        Ok(state.access_token.clone())
    }
}
