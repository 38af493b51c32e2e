//! OAuth token types

use std::fmt;

use serde::{Deserialize, Serialize};

/// A third-party OAuth grant held by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthToken {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_key: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub native_app: bool,
}

impl OAuthToken {
    pub fn display_name(&self) -> &str {
        self.display_text.as_deref().unwrap_or(&self.client_id)
    }
}

/// Wire shape of the token list endpoint. `items` is absent when the user
/// has no tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenList {
    #[serde(default)]
    pub items: Vec<OAuthToken>,
}

impl TokenList {
    /// Tokens ordered by client id.
    pub fn into_sorted(mut self) -> Vec<OAuthToken> {
        self.items.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        self.items
    }
}

/// A (scope, client id) pair used to aggregate token statistics.
///
/// Packs to `"<scope> <client_id>"`: scopes never contain whitespace, so the
/// first space is the separator even when the client id has spaces.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatKey {
    pub scope: String,
    pub client_id: String,
}

impl StatKey {
    pub fn new(scope: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self { scope: scope.into(), client_id: client_id.into() }
    }

    pub fn pack(&self) -> String {
        format!("{} {}", self.scope, self.client_id)
    }

    pub fn unpack(packed: &str) -> Option<Self> {
        let (scope, client_id) = packed.split_once(' ')?;
        if scope.is_empty() || client_id.is_empty() {
            return None;
        }
        Some(Self::new(scope, client_id))
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pack())
    }
}
