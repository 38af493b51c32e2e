//! [`DirectoryApi`] over the Admin SDK users endpoints

use async_trait::async_trait;
use diradmin_core::DirectoryApi;
use diradmin_domain::constants::DIRECTORY_USERS_PATH;
use diradmin_domain::{DirectoryUser, NewUser, Result, UserPage};
use tracing::{debug, info, instrument};

use super::client::ApiClient;

pub(crate) fn user_path(user_key: &str) -> String {
    format!("{DIRECTORY_USERS_PATH}/{}", urlencoding::encode(user_key))
}

#[async_trait]
impl DirectoryApi for ApiClient {
    #[instrument(skip(self))]
    async fn list_users_page(
        &self,
        domain: &str,
        page_size: u32,
        page_token: Option<&str>,
        query: Option<&str>,
    ) -> Result<UserPage> {
        let mut params = vec![
            ("domain", domain.to_string()),
            ("maxResults", page_size.to_string()),
            ("orderBy", "email".to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            params.push(("query", query.to_string()));
        }

        let page: UserPage = self.get(DIRECTORY_USERS_PATH, &params).await?;
        debug!(users = page.users.len(), more = page.next_page_token.is_some(), "users page");
        Ok(page)
    }

    async fn get_user(&self, user_key: &str) -> Result<Option<DirectoryUser>> {
        Ok(self.get_optional(&user_path(user_key), &[]).await?)
    }

    #[instrument(skip(self, user), fields(user = %user.primary_email))]
    async fn insert_user(&self, user: &NewUser) -> Result<DirectoryUser> {
        let created: DirectoryUser = self.post(DIRECTORY_USERS_PATH, user).await?;
        info!("user created");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_key: &str) -> Result<()> {
        self.delete(&user_path(user_key)).await?;
        info!("user deleted");
        Ok(())
    }
}
