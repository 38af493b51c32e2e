//! Port interfaces for directory user management
//!
//! These traits define the boundary between the user use cases and the
//! HTTP adapter that talks to the directory API.

use async_trait::async_trait;
use diradmin_domain::{DirectoryUser, NewUser, Result, UserPage};

/// Directory API operations on users
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// Fetch one page of the users of `domain`, ordered by email.
    async fn list_users_page(
        &self,
        domain: &str,
        page_size: u32,
        page_token: Option<&str>,
        query: Option<&str>,
    ) -> Result<UserPage>;

    /// Get a user by primary email or id. A missing user is `Ok(None)`.
    async fn get_user(&self, user_key: &str) -> Result<Option<DirectoryUser>>;

    /// Create a user
    async fn insert_user(&self, user: &NewUser) -> Result<DirectoryUser>;

    /// Delete a user
    async fn delete_user(&self, user_key: &str) -> Result<()>;
}
