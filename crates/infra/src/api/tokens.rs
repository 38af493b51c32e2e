//! [`TokensApi`] over the Admin SDK tokens endpoints

use async_trait::async_trait;
use diradmin_core::TokensApi;
use diradmin_domain::{OAuthToken, Result, TokenList};
use tracing::{debug, info, instrument};

use super::client::ApiClient;
use super::directory::user_path;
use super::errors::ApiError;

fn tokens_path(user_key: &str) -> String {
    format!("{}/tokens", user_path(user_key))
}

fn token_path(user_key: &str, client_id: &str) -> String {
    format!("{}/{}", tokens_path(user_key), urlencoding::encode(client_id))
}

#[async_trait]
impl TokensApi for ApiClient {
    #[instrument(skip(self))]
    async fn list_tokens(&self, user_key: &str) -> Result<Vec<OAuthToken>> {
        let list: Option<TokenList> = self.get_optional(&tokens_path(user_key), &[]).await?;
        let tokens = list.unwrap_or_default().into_sorted();
        debug!(tokens = tokens.len(), "tokens listed");
        Ok(tokens)
    }

    async fn get_token(&self, user_key: &str, client_id: &str) -> Result<Option<OAuthToken>> {
        Ok(self.get_optional(&token_path(user_key, client_id), &[]).await?)
    }

    #[instrument(skip(self))]
    async fn delete_token(&self, user_key: &str, client_id: &str) -> Result<bool> {
        match self.delete(&token_path(user_key, client_id)).await {
            Ok(()) => {
                info!("token revoked");
                Ok(true)
            }
            Err(ApiError::NotFound(message)) => {
                debug!(%message, "no token to revoke");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use diradmin_common::RetryConfig;
    use diradmin_domain::constants::NO_TOKENS_MESSAGE;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::auth::StaticTokenProvider;
    use crate::api::client::ApiClientConfig;

    fn client(server: &MockServer) -> ApiClient {
        let retry = RetryConfig::builder()
            .max_attempts(2)
            .exponential_backoff(Duration::from_millis(1), Duration::from_millis(2))
            .no_jitter()
            .build()
            .unwrap();
        let config = ApiClientConfig { base_url: server.uri(), retry, ..Default::default() };
        ApiClient::new(config, Arc::new(StaticTokenProvider::new("tok"))).unwrap()
    }

    #[test]
    fn client_ids_with_spaces_are_encoded() {
        assert_eq!(
            token_path("a@x.com", "my app"),
            "/admin/directory/v1/users/a%40x.com/tokens/my%20app"
        );
    }

    #[tokio::test]
    async fn tokens_are_sorted_and_missing_items_mean_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/directory/v1/users/a%40x.com/tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    { "clientId": "zeta.com", "scopes": ["s1"] },
                    { "clientId": "alpha.com", "scopes": ["s2"], "displayText": "Alpha" }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/directory/v1/users/b%40x.com/tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "admin#directory#tokenList"
            })))
            .mount(&server)
            .await;

        let api = client(&server);
        let tokens = api.list_tokens("a@x.com").await.unwrap();
        assert_eq!(tokens[0].display_name(), "Alpha");
        assert_eq!(tokens[1].client_id, "zeta.com");
        assert!(api.list_tokens("b@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_token_existed() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/admin/directory/v1/users/a%40x.com/tokens/present.com"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/admin/directory/v1/users/a%40x.com/tokens/absent.com"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": { "message": NO_TOKENS_MESSAGE }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server);
        assert!(api.delete_token("a@x.com", "present.com").await.unwrap());
        assert!(!api.delete_token("a@x.com", "absent.com").await.unwrap());
    }
}
