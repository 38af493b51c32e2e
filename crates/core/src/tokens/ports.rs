//! Port interfaces for the token API

use async_trait::async_trait;
use diradmin_domain::{OAuthToken, Result};

/// Directory API operations on a user's OAuth tokens
#[async_trait]
pub trait TokensApi: Send + Sync {
    /// All tokens issued by `user_key`, ordered by client id. A user without
    /// tokens yields an empty list.
    async fn list_tokens(&self, user_key: &str) -> Result<Vec<OAuthToken>>;

    /// The token issued by `user_key` to `client_id`, if any.
    async fn get_token(&self, user_key: &str, client_id: &str) -> Result<Option<OAuthToken>>;

    /// Revoke the token. Returns `false` when there was no token to revoke.
    async fn delete_token(&self, user_key: &str, client_id: &str) -> Result<bool>;
}
