//! In-memory port implementations

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use diradmin_core::{DirectoryApi, ScanStore, TokensApi};
use diradmin_domain::{
    DirAdminError, DirectoryUser, NewUser, OAuthToken, Result as DomainResult, ScanState, UserPage,
};
use parking_lot::Mutex;

pub fn user(email: &str) -> DirectoryUser {
    serde_json::from_value(serde_json::json!({ "primaryEmail": email })).expect("valid user json")
}

pub fn token(client_id: &str, scopes: &[&str]) -> OAuthToken {
    OAuthToken {
        client_id: client_id.to_string(),
        display_text: Some(client_id.to_string()),
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
        user_key: None,
        anonymous: false,
        native_app: false,
    }
}

/// Directory with a fixed user list, paged by decimal offsets.
#[derive(Default)]
pub struct MockDirectory {
    users: Vec<DirectoryUser>,
}

impl MockDirectory {
    pub fn with_users(emails: &[&str]) -> Self {
        Self { users: emails.iter().map(|e| user(e)).collect() }
    }
}

#[async_trait]
impl DirectoryApi for MockDirectory {
    async fn list_users_page(
        &self,
        _domain: &str,
        page_size: u32,
        page_token: Option<&str>,
        _query: Option<&str>,
    ) -> DomainResult<UserPage> {
        let offset = match page_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| DirAdminError::Rejected(format!("invalid page token {token}")))?,
        };
        let end = (offset + page_size as usize).min(self.users.len());
        Ok(UserPage {
            users: self.users[offset..end].to_vec(),
            next_page_token: (end < self.users.len()).then(|| end.to_string()),
        })
    }

    async fn get_user(&self, user_key: &str) -> DomainResult<Option<DirectoryUser>> {
        Ok(self.users.iter().find(|u| u.primary_email == user_key).cloned())
    }

    async fn insert_user(&self, new_user: &NewUser) -> DomainResult<DirectoryUser> {
        Ok(user(&new_user.primary_email))
    }

    async fn delete_user(&self, _user_key: &str) -> DomainResult<()> {
        Ok(())
    }
}

/// Token API with per-user tokens and scripted failures.
#[derive(Default)]
pub struct MockTokens {
    tokens: Mutex<BTreeMap<String, Vec<OAuthToken>>>,
    failures: Mutex<HashMap<String, Vec<DirAdminError>>>,
    list_calls: Mutex<Vec<String>>,
}

impl MockTokens {
    pub fn grant(self, user: &str, token: OAuthToken) -> Self {
        self.tokens.lock().entry(user.to_string()).or_default().push(token);
        self
    }

    /// Queue errors returned by the next calls for `user`, in order.
    pub fn fail(self, user: &str, errors: Vec<DirAdminError>) -> Self {
        self.failures.lock().insert(user.to_string(), errors);
        self
    }

    pub fn list_calls(&self) -> Vec<String> {
        self.list_calls.lock().clone()
    }

    pub fn remaining(&self, user: &str) -> Vec<OAuthToken> {
        self.tokens.lock().get(user).cloned().unwrap_or_default()
    }

    fn next_failure(&self, user: &str) -> Option<DirAdminError> {
        let mut failures = self.failures.lock();
        let queue = failures.get_mut(user)?;
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }
}

#[async_trait]
impl TokensApi for MockTokens {
    async fn list_tokens(&self, user_key: &str) -> DomainResult<Vec<OAuthToken>> {
        self.list_calls.lock().push(user_key.to_string());
        if let Some(err) = self.next_failure(user_key) {
            return Err(err);
        }
        Ok(self.remaining(user_key))
    }

    async fn get_token(&self, user_key: &str, client_id: &str) -> DomainResult<Option<OAuthToken>> {
        Ok(self.remaining(user_key).into_iter().find(|t| t.client_id == client_id))
    }

    async fn delete_token(&self, user_key: &str, client_id: &str) -> DomainResult<bool> {
        if let Some(err) = self.next_failure(user_key) {
            return Err(err);
        }
        let mut tokens = self.tokens.lock();
        let Some(held) = tokens.get_mut(user_key) else {
            return Ok(false);
        };
        let before = held.len();
        held.retain(|t| t.client_id != client_id);
        Ok(held.len() < before)
    }
}

/// Scan store kept in memory. `crash_after` makes the n-th save (1-based)
/// and every save after it fail, as if the process had died.
pub struct MemoryStore<T> {
    state: Mutex<Option<ScanState<T>>>,
    saves: AtomicUsize,
    crash_after: Mutex<Option<usize>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self { state: Mutex::new(None), saves: AtomicUsize::new(0), crash_after: Mutex::new(None) }
    }
}

impl<T: Clone> MemoryStore<T> {
    pub fn crashing_at(save: usize) -> Self {
        let store = Self::default();
        *store.crash_after.lock() = Some(save);
        store
    }

    pub fn recover(&self) {
        *self.crash_after.lock() = None;
    }

    pub fn snapshot(&self) -> Option<ScanState<T>> {
        self.state.lock().clone()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> ScanStore<T> for MemoryStore<T> {
    async fn load(&self) -> DomainResult<Option<ScanState<T>>> {
        Ok(self.state.lock().clone())
    }

    async fn save(&self, state: &ScanState<T>) -> DomainResult<()> {
        let n = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        if self.crash_after.lock().is_some_and(|limit| n >= limit) {
            return Err(DirAdminError::Storage("simulated crash".into()));
        }
        *self.state.lock() = Some(state.clone());
        Ok(())
    }

    async fn discard(&self) -> DomainResult<()> {
        *self.state.lock() = None;
        Ok(())
    }
}
