//! API client with bounded retry
//!
//! Every call goes through one [`RetryExecutor`] configured from
//! [`RetrySettings`](diradmin_domain::RetrySettings). Transient failures
//! (throttling, including 403s whose reason is a rate limit or quota, 5xx,
//! network) are retried with exponential backoff and jitter; a `Retry-After` header overrides the computed delay. Everything
//! else stops at the first attempt.

use std::sync::Arc;
use std::time::Duration;

use diradmin_common::{RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryPolicy};
use diradmin_domain::constants::{DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT, NO_TOKENS_MESSAGE};
use diradmin_domain::AppConfig;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::auth::AccessTokenProvider;
use super::errors::ApiError;
use crate::http::HttpClient;

const API_ACCESS_HINT: &str =
    "enable API access for the domain in the admin console (Security > API reference)";

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryConfig,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryConfig::default(),
        }
    }
}

impl ApiClientConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ApiError> {
        let retry = RetryConfig::builder()
            .max_attempts(config.retry.max_attempts)
            .exponential_backoff(config.retry.base_delay(), config.retry.max_delay())
            .equal_jitter()
            .build()
            .map_err(|err| ApiError::Config(err.to_string()))?;

        Ok(Self {
            base_url: config.api.base_url.clone(),
            timeout: config.api.timeout(),
            user_agent: config.api.user_agent.clone(),
            retry,
        })
    }
}

/// Retries transient API errors, honouring `Retry-After` up to `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct ApiRetryPolicy {
    max_delay: Duration,
}

impl ApiRetryPolicy {
    pub fn new(max_delay: Duration) -> Self {
        Self { max_delay }
    }
}

impl RetryPolicy<ApiError> for ApiRetryPolicy {
    fn should_retry(&self, error: &ApiError, _attempt: u32) -> RetryDecision {
        if !error.should_retry() {
            return RetryDecision::Stop;
        }
        match error.retry_after() {
            Some(delay) => RetryDecision::RetryAfter(delay.min(self.max_delay)),
            None => RetryDecision::Retry,
        }
    }
}

#[derive(Deserialize)]
struct VendorErrorBody {
    error: VendorError,
}

#[derive(Deserialize)]
struct VendorError {
    message: String,
    #[serde(default)]
    errors: Vec<VendorErrorDetail>,
}

#[derive(Deserialize)]
struct VendorErrorDetail {
    #[serde(default)]
    reason: String,
}

/// 403 reasons the directory API uses for throttling and quota.
const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded", "quotaExceeded"];

impl VendorError {
    fn is_rate_limited(&self) -> bool {
        self.errors.iter().any(|detail| RATE_LIMIT_REASONS.contains(&detail.reason.as_str()))
    }
}

/// Authenticated JSON client for the directory API.
pub struct ApiClient {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    base_url: String,
    retry: RetryExecutor<ApiRetryPolicy>,
}

impl ApiClient {
    pub fn new(config: ApiClientConfig, auth: Arc<dyn AccessTokenProvider>) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        let policy = ApiRetryPolicy::new(config.retry.backoff.max_delay());

        Ok(Self {
            http,
            auth,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryExecutor::new(config.retry, policy),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let body = self.execute(Method::GET, path, query, None).await?;
        decode(&body)
    }

    /// GET that maps 404 to `None`.
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ApiError> {
        match self.get(path, query).await {
            Ok(value) => Ok(Some(value)),
            Err(ApiError::NotFound(message)) => {
                debug!(path, %message, "resource not found");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|err| ApiError::Config(format!("failed to serialize body: {err}")))?;
        let response = self.execute(Method::POST, path, &[], Some(&body)).await?;
        decode(&response)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, &[], None).await.map(|_| ())
    }

    #[instrument(skip(self, query, body))]
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let outcome =
            self.retry.execute_with_outcome(|| self.attempt(&method, &url, query, body)).await;

        match outcome.result {
            Ok(text) => {
                debug!(attempts = outcome.attempts, "request succeeded");
                Ok(text)
            }
            Err(RetryError::AttemptsExhausted { attempts, source }) => {
                Err(ApiError::RetriesExhausted { attempts, last: Box::new(source) })
            }
            Err(RetryError::NonRetryable { source }) => Err(source),
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<String, ApiError> {
        // fetched per attempt so a refresh between retries takes effect
        let token = self.auth.access_token().await?;

        let mut request = self.http.request(method.clone(), url).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.http.send(request).await?;
        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }
        debug!(status = status.as_u16(), "request failed");
        Err(status_error(status, &text, retry_after))
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
}

/// `Retry-After` in delta-seconds form. HTTP dates are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn status_error(status: StatusCode, body: &str, retry_after: Option<Duration>) -> ApiError {
    let vendor = serde_json::from_str::<VendorErrorBody>(body).ok().map(|parsed| parsed.error);
    let rate_limited = vendor.as_ref().is_some_and(VendorError::is_rate_limited);
    let mut message = vendor.map(|error| error.message).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() { status.to_string() } else { body.to_string() }
    });

    if status == StatusCode::FORBIDDEN && rate_limited {
        return ApiError::RateLimit { message, retry_after };
    }
    if status == StatusCode::FORBIDDEN && message.contains("Domain cannot use apis") {
        message = format!("{message} ({API_ACCESS_HINT})");
    }
    if status == StatusCode::INTERNAL_SERVER_ERROR && message.contains(NO_TOKENS_MESSAGE) {
        return ApiError::NotFound(message);
    }
    ApiError::from_status(status, message, retry_after)
}
