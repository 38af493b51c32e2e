//! Token statistics: which clients hold which scopes for how many users

use std::collections::{BTreeMap, BTreeSet};

use diradmin_domain::{OAuthToken, StatKey};

/// Users holding a token per (scope, client id) pair.
pub type StatMap = BTreeMap<StatKey, BTreeSet<String>>;

/// Flatten collected results (`user -> tokens`) into a [`StatMap`], one
/// entry per scope granted to each client.
pub fn build_stat_map<'a, I>(results: I) -> StatMap
where
    I: IntoIterator<Item = (&'a String, &'a Vec<OAuthToken>)>,
{
    let mut stats = StatMap::new();
    for (user, tokens) in results {
        for token in tokens {
            for scope in &token.scopes {
                stats
                    .entry(StatKey::new(scope.as_str(), token.client_id.as_str()))
                    .or_default()
                    .insert(user.clone());
            }
        }
    }
    stats
}

/// Distinct users that granted any scope to `client_id`, sorted.
pub fn users_for_client(stats: &StatMap, client_id: &str) -> Vec<String> {
    stats
        .iter()
        .filter(|(key, _)| key.client_id == client_id)
        .flat_map(|(_, users)| users.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Secondaries (scopes or clients) shared by exactly the same users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGroup {
    pub secondaries: BTreeSet<String>,
    pub users: BTreeSet<String>,
}

/// Stats keyed by a primary (client id or scope).
///
/// Each primary holds groups of secondaries; a secondary whose user set
/// equals an existing group's joins that group.
#[derive(Debug, Clone, Default)]
pub struct TokenStats {
    groups: BTreeMap<String, Vec<TokenGroup>>,
}

impl TokenStats {
    /// Primary = client id, secondary = scope
    pub fn by_client(stats: &StatMap) -> Self {
        let mut summary = Self::default();
        for (key, users) in stats {
            summary.add(&key.client_id, &key.scope, users);
        }
        summary
    }

    /// Primary = scope, secondary = client id
    pub fn by_scope(stats: &StatMap) -> Self {
        let mut summary = Self::default();
        for (key, users) in stats {
            summary.add(&key.scope, &key.client_id, users);
        }
        summary
    }

    pub fn add(&mut self, primary: &str, secondary: &str, users: &BTreeSet<String>) {
        let groups = self.groups.entry(primary.to_string()).or_default();
        match groups.iter_mut().find(|group| group.users == *users) {
            Some(group) => {
                group.secondaries.insert(secondary.to_string());
            }
            None => groups.push(TokenGroup {
                secondaries: BTreeSet::from([secondary.to_string()]),
                users: users.clone(),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Distinct users per primary, most users first; ties by key.
    pub fn rankings(&self) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self
            .groups
            .iter()
            .map(|(primary, groups)| {
                let users: BTreeSet<&String> = groups.iter().flat_map(|g| g.users.iter()).collect();
                (primary.clone(), users.len())
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// The `n` highest ranked primaries; `0` returns all of them.
    pub fn top_n(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked = self.rankings();
        if n > 0 {
            ranked.truncate(n);
        }
        ranked
    }

    /// Groups of `primary`, largest user set first.
    pub fn groups(&self, primary: &str) -> Vec<&TokenGroup> {
        let mut groups: Vec<&TokenGroup> =
            self.groups.get(primary).map(|g| g.iter().collect()).unwrap_or_default();
        groups.sort_by(|a, b| b.users.len().cmp(&a.users.len()));
        groups
    }
}
