//! Entity sources for user scans

use std::sync::Arc;

use async_trait::async_trait;
use diradmin_domain::{DirAdminError, Result, UserSummary};

use super::ports::{EntityPage, EntitySource};
use crate::user::ports::DirectoryApi;

/// Lists the users of a domain through the directory API.
pub struct DomainUserSource {
    api: Arc<dyn DirectoryApi>,
    domain: String,
    query: Option<String>,
}

impl DomainUserSource {
    pub fn new(api: Arc<dyn DirectoryApi>, domain: impl Into<String>) -> Self {
        Self { api, domain: domain.into(), query: None }
    }

    /// Restrict the listing with a directory search query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

#[async_trait]
impl EntitySource<UserSummary> for DomainUserSource {
    async fn fetch_page(
        &self,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<EntityPage<UserSummary>> {
        let page = self
            .api
            .list_users_page(&self.domain, page_size, page_token, self.query.as_deref())
            .await?;

        Ok(EntityPage {
            entities: page.users.iter().map(UserSummary::from).collect(),
            next_page_token: page.next_page_token,
        })
    }
}

/// Pages over an already-known user list (the cached `users.json`).
///
/// Page tokens are decimal offsets into the sorted list.
#[derive(Debug, Clone)]
pub struct KnownUserSource {
    users: Vec<UserSummary>,
}

impl KnownUserSource {
    pub fn new(mut users: Vec<UserSummary>) -> Self {
        users.sort();
        users.dedup_by(|a, b| a.email == b.email);
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl EntitySource<UserSummary> for KnownUserSource {
    async fn fetch_page(
        &self,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<EntityPage<UserSummary>> {
        let offset = match page_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .ok()
                .filter(|offset| *offset <= self.users.len())
                .ok_or_else(|| DirAdminError::Rejected(format!("invalid page token '{token}'")))?,
        };

        let end = offset.saturating_add(page_size.max(1) as usize).min(self.users.len());
        Ok(EntityPage {
            entities: self.users[offset..end].to_vec(),
            next_page_token: (end < self.users.len()).then(|| end.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(emails: &[&str]) -> Vec<UserSummary> {
        emails.iter().map(|e| UserSummary::from_email(*e)).collect()
    }

    #[tokio::test]
    async fn known_users_page_in_sorted_order() {
        let source = KnownUserSource::new(users(&["c@x.com", "a@x.com", "b@x.com", "a@x.com"]));
        assert_eq!(source.len(), 3);

        let first = source.fetch_page(None, 2).await.unwrap();
        assert_eq!(first.entities, users(&["a@x.com", "b@x.com"]));
        assert_eq!(first.next_page_token.as_deref(), Some("2"));

        let second = source.fetch_page(Some("2"), 2).await.unwrap();
        assert_eq!(second.entities, users(&["c@x.com"]));
        assert!(second.next_page_token.is_none());
    }

    #[tokio::test]
    async fn foreign_page_token_is_rejected() {
        let source = KnownUserSource::new(users(&["a@x.com"]));

        let err = source.fetch_page(Some("CkQKFHNvbWV0aGluZw"), 10).await.unwrap_err();
        assert!(matches!(err, DirAdminError::Rejected(_)));

        let err = source.fetch_page(Some("7"), 10).await.unwrap_err();
        assert!(matches!(err, DirAdminError::Rejected(_)));
    }

    #[tokio::test]
    async fn empty_list_yields_one_empty_page() {
        let source = KnownUserSource::new(Vec::new());
        let page = source.fetch_page(None, 100).await.unwrap();
        assert!(page.entities.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
