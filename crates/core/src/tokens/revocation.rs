//! Blacklist-driven revocation of unapproved tokens

use std::collections::{BTreeMap, BTreeSet};

use diradmin_domain::{DirAdminError, ErrorClass, Result, StatKey};
use tracing::{error, info, instrument};

use super::ports::TokensApi;
use super::stats::StatMap;

/// Unapproved clients and scopes.
///
/// Scopes are stored without a trailing `/` since the API reports them
/// both with and without one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklists {
    clients: BTreeSet<String>,
    scopes: BTreeSet<String>,
}

impl Blacklists {
    /// Build the lists. Fails when both are empty since nothing could match.
    pub fn new<C, S>(clients: C, scopes: S) -> Result<Self>
    where
        C: IntoIterator<Item = String>,
        S: IntoIterator<Item = String>,
    {
        let clients: BTreeSet<String> = clients.into_iter().collect();
        let scopes: BTreeSet<String> =
            scopes.into_iter().map(|s| s.trim_end_matches('/').to_string()).collect();

        if clients.is_empty() && scopes.is_empty() {
            return Err(DirAdminError::InvalidInput(
                "all blacklists are empty; there is nothing to revoke".into(),
            ));
        }
        Ok(Self { clients, scopes })
    }

    /// Entries of a blacklist file: one per line, blank lines and `#`
    /// comments skipped.
    pub fn parse_lines(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    }

    pub fn matches_client(&self, client_id: &str) -> bool {
        self.clients.contains(client_id)
    }

    pub fn matches_scope(&self, scope: &str) -> bool {
        !scope.is_empty() && self.scopes.contains(scope.trim_end_matches('/'))
    }

    pub fn matches(&self, key: &StatKey) -> bool {
        self.matches_client(&key.client_id) || self.matches_scope(&key.scope)
    }
}

/// Tokens to revoke, grouped by client id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevocationPlan {
    by_client: BTreeMap<String, BTreeSet<String>>,
}

impl RevocationPlan {
    pub fn from_stats(stats: &StatMap, blacklists: &Blacklists) -> Self {
        let mut by_client: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (key, users) in stats.iter().filter(|(key, _)| blacklists.matches(key)) {
            by_client.entry(key.client_id.clone()).or_default().extend(users.iter().cloned());
        }
        Self { by_client }
    }

    pub fn is_empty(&self) -> bool {
        self.by_client.is_empty()
    }

    /// Number of (client, user) tokens in the plan
    pub fn len(&self) -> usize {
        self.by_client.values().map(BTreeSet::len).sum()
    }

    pub fn clients(&self) -> impl Iterator<Item = &str> {
        self.by_client.keys().map(String::as_str)
    }

    /// `(client_id, user)` pairs sorted by client, then user.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_client
            .iter()
            .flat_map(|(client, users)| users.iter().map(move |user| (client.as_str(), user.as_str())))
    }
}

/// Counters from executing a [`RevocationPlan`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevocationSummary {
    pub revoked: u64,
    pub absent: u64,
    pub failed: Vec<(String, String, String)>,
}

impl RevocationSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Revoke every token in `plan`. Per-token failures are logged and counted;
/// a scan-fatal error stops the run.
#[instrument(skip_all, fields(tokens = plan.len()))]
pub async fn revoke_planned(tokens: &dyn TokensApi, plan: &RevocationPlan) -> Result<RevocationSummary> {
    let mut summary = RevocationSummary::default();
    if plan.is_empty() {
        info!("no tokens found to revoke");
        return Ok(summary);
    }

    info!("tokens found to revoke, revoking now");
    for (client_id, user) in plan.iter() {
        info!(user, client_id, "revoking token");
        match tokens.delete_token(user, client_id).await {
            Ok(true) => summary.revoked += 1,
            Ok(false) => summary.absent += 1,
            Err(err) if err.class() == ErrorClass::ScanFatal => return Err(err),
            Err(err) => {
                error!(user, client_id, error = %err, "unable to revoke token");
                summary.failed.push((client_id.to_string(), user.to_string(), err.to_string()));
            }
        }
    }
    Ok(summary)
}
