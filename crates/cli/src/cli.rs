//! Command line definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Directory user administration and OAuth token reporting/revocation
#[derive(Debug, Parser)]
#[command(name = "diradmin", version, about, long_about = None)]
pub struct Cli {
    /// Domain to operate on (defaults to the stored default domain)
    #[arg(short, long, global = true)]
    pub domain: Option<String>,

    /// Debug level console logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML or JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working directory for credentials, caches and reports
    #[arg(long, global = true, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a domain (and its customer id) as the default for later commands
    SetDefaultDomain(SetDefaultDomainArgs),
    /// Print the customer id of the domain
    LsCustomerId,
    /// List domain users
    LsUsers(LsUsersArgs),
    /// Show one user
    LsUser(LsUserArgs),
    /// Create a user
    AddUser(AddUserArgs),
    /// Delete a user
    RmUser(RmUserArgs),
    /// List the tokens a user granted
    LsTokens(LsTokensArgs),
    /// Revoke the token a user granted to one client
    RevokeToken(RevokeTokenArgs),
    /// Collect every user's tokens into the local token stats (resumable)
    GatherTokenStats(GatherTokenStatsArgs),
    /// Report the most common client ids and scopes from local token stats
    ReportTokenStats(ReportTokenStatsArgs),
    /// Revoke one client's tokens across the domain (resumable)
    RevokeDomainClient(RevokeDomainClientArgs),
    /// Revoke every token matched by the client or scope blacklists
    RevokeUnapproved(RevokeUnapprovedArgs),
}

#[derive(Debug, Args)]
pub struct SetDefaultDomainArgs {
    /// Domain to store
    pub domain: String,

    /// Overwrite an existing default
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct LsUsersArgs {
    /// Stop after N users (0 lists all)
    #[arg(long, default_value_t = 0)]
    pub first_n: u32,

    /// Directory search query, e.g. `orgUnitPath=/Sales`
    #[arg(short, long)]
    pub query: Option<String>,

    /// Write the list to the users file instead of printing it
    #[arg(long)]
    pub json: bool,

    /// Overwrite an existing users file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct LsUserArgs {
    #[arg(short, long, value_name = "EMAIL")]
    pub user: String,

    /// Print every user field
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Debug, Args)]
pub struct AddUserArgs {
    #[arg(short, long, value_name = "EMAIL")]
    pub user: String,

    #[arg(long, value_name = "NAME")]
    pub first: String,

    #[arg(long, value_name = "NAME")]
    pub last: String,

    #[arg(long)]
    pub password: String,

    /// Re-read the user after creating it
    #[arg(long)]
    pub verify: bool,
}

#[derive(Debug, Args)]
pub struct RmUserArgs {
    #[arg(short, long, value_name = "EMAIL")]
    pub user: String,

    /// Required to confirm the deletion
    #[arg(short, long)]
    pub force: bool,

    /// Check the user is gone after deleting it
    #[arg(long)]
    pub verify: bool,
}

#[derive(Debug, Args)]
pub struct LsTokensArgs {
    #[arg(short, long, value_name = "EMAIL")]
    pub user: String,

    /// Only the token granted to this client
    #[arg(short, long, value_name = "CLIENT_ID")]
    pub client_id: Option<String>,

    /// Also print scopes
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Debug, Args)]
pub struct RevokeTokenArgs {
    #[arg(short, long, value_name = "EMAIL")]
    pub user: String,

    #[arg(short, long, value_name = "CLIENT_ID")]
    pub client_id: String,
}

#[derive(Debug, Args)]
pub struct GatherTokenStatsArgs {
    /// Stop after N users (0 scans all)
    #[arg(long, default_value_t = 0)]
    pub first_n: u64,

    /// Discard an interrupted scan instead of resuming it
    #[arg(long)]
    pub restart: bool,
}

#[derive(Debug, Args)]
pub struct ReportTokenStatsArgs {
    /// Show the scopes (or clients) behind each entry
    #[arg(short, long)]
    pub long: bool,

    /// Show the users behind each entry (implies --long)
    #[arg(short = 'u', long)]
    pub show_users: bool,

    /// Only the N most common entries (0 shows all)
    #[arg(long, default_value_t = 0)]
    pub top_n: usize,

    /// Also write the rankings as CSV files
    #[arg(long)]
    pub csv: bool,

    /// Overwrite existing CSV files
    #[arg(short, long)]
    pub force: bool,
}

impl ReportTokenStatsArgs {
    pub const fn long_list(&self) -> bool {
        self.long || self.show_users
    }
}

#[derive(Debug, Args)]
pub struct RevokeDomainClientArgs {
    #[arg(short, long, value_name = "CLIENT_ID")]
    pub client_id: String,

    /// Only visit users the local token stats show holding a token
    #[arg(long)]
    pub use_local_token_stats: bool,

    /// Stop after N users (0 scans all)
    #[arg(long, default_value_t = 0)]
    pub first_n: u64,

    /// Discard an interrupted scan instead of resuming it
    #[arg(long)]
    pub restart: bool,
}

#[derive(Debug, Args)]
pub struct RevokeUnapprovedArgs {
    /// Required to confirm the revocation
    #[arg(short, long)]
    pub force: bool,

    /// File of client ids to revoke, one per line
    #[arg(long, value_name = "FILE")]
    pub client_blacklist: Option<PathBuf>,

    /// File of scopes to revoke, one per line
    #[arg(long, value_name = "FILE")]
    pub scope_blacklist: Option<PathBuf>,

    /// Use the existing token stats instead of gathering them first
    #[arg(long)]
    pub use_local_token_stats: bool,

    /// Discard an interrupted gather instead of resuming it
    #[arg(long)]
    pub restart: bool,
}
