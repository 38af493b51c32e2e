//! OAuth token use cases: collection, statistics and revocation

pub mod ports;
pub mod processors;
pub mod revocation;
pub mod scopes;
pub mod stats;

pub use ports::TokensApi;
pub use processors::{ClientRevoker, RevocationOutcome, TokenCollector};
pub use revocation::{revoke_planned, Blacklists, RevocationPlan, RevocationSummary};
pub use scopes::lookup_scope;
pub use stats::{build_stat_map, users_for_client, StatMap, TokenGroup, TokenStats};
