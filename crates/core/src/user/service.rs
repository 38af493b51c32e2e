//! User management service - listing, lookup, add and remove

use std::sync::Arc;
use std::time::Duration;

use diradmin_common::validate_email;
use diradmin_domain::constants::VERIFY_SETTLE_SECS;
use diradmin_domain::{effective_page_size, DirAdminError, DirectoryUser, NewUser, Result};
use tracing::{debug, info, warn};

use super::ports::DirectoryApi;

/// User management service
pub struct UserService {
    api: Arc<dyn DirectoryApi>,
    verify_delay: Duration,
}

impl UserService {
    pub fn new(api: Arc<dyn DirectoryApi>) -> Self {
        Self { api, verify_delay: Duration::from_secs(VERIFY_SETTLE_SECS) }
    }

    /// Override how long `add_user`/`remove_user` wait before verifying.
    pub fn with_verify_delay(mut self, delay: Duration) -> Self {
        self.verify_delay = delay;
        self
    }

    /// List the users of `domain`, following page tokens until the listing
    /// ends or `max_results` users were collected.
    pub async fn list_users(
        &self,
        domain: &str,
        page_size: u32,
        max_results: Option<u32>,
        query: Option<&str>,
    ) -> Result<Vec<DirectoryUser>> {
        let max_results = max_results.filter(|n| *n > 0).map(|n| n as usize);
        let page_size = effective_page_size(page_size, max_results.map(|n| n as u32));
        let mut users = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page =
                self.api.list_users_page(domain, page_size, page_token.as_deref(), query).await?;
            debug!(domain, fetched = page.users.len(), "listed user page");
            users.extend(page.users);

            if let Some(max) = max_results {
                if users.len() >= max {
                    users.truncate(max);
                    break;
                }
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(users)
    }

    /// Customer id of the account that owns `domain`, read from its first user.
    pub async fn customer_id(&self, domain: &str) -> Result<String> {
        let page = self.api.list_users_page(domain, 1, None, None).await?;
        page.users
            .into_iter()
            .find_map(|user| user.customer_id)
            .ok_or_else(|| DirAdminError::NotFound(format!("no users with a customer id in {domain}")))
    }

    pub async fn get_user(&self, user_key: &str) -> Result<Option<DirectoryUser>> {
        self.api.get_user(user_key).await
    }

    /// Create a user. With `verify`, wait for the directory to settle and
    /// re-read the user.
    pub async fn add_user(&self, new_user: &NewUser, verify: bool) -> Result<DirectoryUser> {
        let email = validate_email(&new_user.primary_email)
            .map_err(|e| DirAdminError::InvalidInput(e.to_string()))?;

        if self.api.get_user(email).await?.is_some() {
            return Err(DirAdminError::AlreadyExists(format!("user {email}")));
        }

        let created = self.api.insert_user(new_user).await?;
        info!(email, id = ?created.id, "user created");

        if !verify {
            return Ok(created);
        }

        tokio::time::sleep(self.verify_delay).await;
        match self.api.get_user(email).await? {
            Some(user) => Ok(user),
            None => {
                warn!(email, "created user is not visible yet");
                Err(DirAdminError::NotFound(format!("user {email} after insert")))
            }
        }
    }

    /// Delete a user. With `verify`, wait and confirm the user is gone.
    pub async fn remove_user(&self, email: &str, verify: bool) -> Result<()> {
        let email =
            validate_email(email).map_err(|e| DirAdminError::InvalidInput(e.to_string()))?;

        if self.api.get_user(email).await?.is_none() {
            return Err(DirAdminError::NotFound(format!("user {email}")));
        }

        self.api.delete_user(email).await?;
        info!(email, "user deleted");

        if verify {
            tokio::time::sleep(self.verify_delay).await;
            if self.api.get_user(email).await?.is_some() {
                return Err(DirAdminError::Internal(format!("user {email} still present after delete")));
            }
        }
        Ok(())
    }
}
