//! Subcommand handlers
//!
//! Each handler prints its user-facing output to stdout and returns how the
//! command ended; errors propagate to `main`.

pub mod defaults;
pub mod revoke;
pub mod stats;
pub mod tokens;
pub mod users;

use diradmin_domain::{AppConfig, Result, ScanReport};
use diradmin_infra::WorkDir;

use crate::cli::{Cli, Command};
use crate::session::{resolve_domain, Session};

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Aborted before finishing; nothing further was attempted.
    Failed,
    /// Finished, but some entities or tokens failed.
    PartialFailure,
}

impl Outcome {
    pub const fn from_report(report: &ScanReport) -> Self {
        if !report.is_completed() {
            Self::Failed
        } else if report.has_failures() {
            Self::PartialFailure
        } else {
            Self::Success
        }
    }

    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failed => 1,
            Self::PartialFailure => 2,
        }
    }
}

pub(crate) fn print_lines(lines: impl IntoIterator<Item = String>) {
    for line in lines {
        println!("{line}");
    }
}

async fn open(domain: Option<&str>, config: AppConfig) -> Result<Session> {
    let work = WorkDir::new(&config.work_dir);
    let domain = resolve_domain(domain, &work, &config).await?;
    Session::open(config, &domain).await
}

/// Run the parsed command against `config`.
///
/// # Errors
/// Any error that ends the command early: invalid input, missing
/// credentials, API or storage failures.
pub async fn run(cli: Cli, config: AppConfig) -> Result<Outcome> {
    let domain = cli.domain.as_deref();
    match cli.command {
        Command::SetDefaultDomain(args) => defaults::set_default_domain(config, &args).await,
        Command::LsCustomerId => defaults::ls_customer_id(&open(domain, config).await?).await,
        Command::LsUsers(args) => users::ls_users(&open(domain, config).await?, &args).await,
        Command::LsUser(args) => users::ls_user(&open(domain, config).await?, &args).await,
        Command::AddUser(args) => users::add_user(&open(domain, config).await?, &args).await,
        Command::RmUser(args) => users::rm_user(&open(domain, config).await?, &args).await,
        Command::LsTokens(args) => tokens::ls_tokens(&open(domain, config).await?, &args).await,
        Command::RevokeToken(args) => {
            tokens::revoke_token(&open(domain, config).await?, &args).await
        }
        Command::GatherTokenStats(args) => {
            stats::gather_token_stats(&open(domain, config).await?, &args).await
        }
        Command::ReportTokenStats(args) => {
            // local files only, no credentials needed
            let work = WorkDir::new(&config.work_dir);
            let domain = resolve_domain(domain, &work, &config).await?;
            stats::report_token_stats(&work, &domain, &args).await
        }
        Command::RevokeDomainClient(args) => {
            revoke::revoke_domain_client(&open(domain, config).await?, &args).await
        }
        Command::RevokeUnapproved(args) => {
            revoke::revoke_unapproved(&open(domain, config).await?, &args).await
        }
    }
}
