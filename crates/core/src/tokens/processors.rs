//! Per-user processors plugged into the batch runner

use std::sync::Arc;

use async_trait::async_trait;
use diradmin_domain::{OAuthToken, Result, UserSummary};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ports::TokensApi;
use crate::batch::ports::EntityProcessor;

/// Lists every token of a user; the result cache becomes the token stats
/// source.
pub struct TokenCollector {
    tokens: Arc<dyn TokensApi>,
}

impl TokenCollector {
    pub fn new(tokens: Arc<dyn TokensApi>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl EntityProcessor<UserSummary, Vec<OAuthToken>> for TokenCollector {
    async fn process(&self, user: &UserSummary) -> Result<Vec<OAuthToken>> {
        let tokens = self.tokens.list_tokens(&user.email).await?;
        debug!(user = %user.email, tokens = tokens.len(), "collected tokens");
        Ok(tokens)
    }
}

/// What happened when revoking one user's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationOutcome {
    Revoked,
    NoToken,
}

/// Revokes the token a fixed client holds for each visited user.
pub struct ClientRevoker {
    tokens: Arc<dyn TokensApi>,
    client_id: String,
}

impl ClientRevoker {
    pub fn new(tokens: Arc<dyn TokensApi>, client_id: impl Into<String>) -> Self {
        Self { tokens, client_id: client_id.into() }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

#[async_trait]
impl EntityProcessor<UserSummary, RevocationOutcome> for ClientRevoker {
    async fn process(&self, user: &UserSummary) -> Result<RevocationOutcome> {
        if self.tokens.delete_token(&user.email, &self.client_id).await? {
            info!(user = %user.email, client_id = %self.client_id, "token revoked");
            Ok(RevocationOutcome::Revoked)
        } else {
            debug!(user = %user.email, client_id = %self.client_id, "no token to revoke");
            Ok(RevocationOutcome::NoToken)
        }
    }
}
