//! Domain-wide revocation: one client for every user, or everything the
//! blacklists match

use std::path::Path;
use std::sync::Arc;

use diradmin_core::{
    revoke_planned, users_for_client, BatchRunner, Blacklists, ClientRevoker, DomainUserSource,
    EntitySource, KnownUserSource, RevocationOutcome, RevocationPlan,
};
use diradmin_domain::constants::REVOCATION_SCAN;
use diradmin_domain::{DirAdminError, Result, UserSummary};
use diradmin_infra::WorkDir;
use tracing::info;

use super::stats::{collect_tokens, load_stat_map};
use super::tokens::checked_client_id;
use super::Outcome;
use crate::cli::{RevokeDomainClientArgs, RevokeUnapprovedArgs};
use crate::report;
use crate::session::Session;

const BLIND_REVOCATION_NOTE: &str = "\
NOTE: revocation was attempted for every domain user without checking first
      whether a token was granted, so the log does not show which users
      actually held one. Run gather-token-stats and pass
      --use-local-token-stats to log only real revocations.";

fn print_log_location(session: &Session) {
    println!("Revocation details logged to: {}.", session.work.log_path().display());
}

pub async fn revoke_domain_client(
    session: &Session,
    args: &RevokeDomainClientArgs,
) -> Result<Outcome> {
    let client_id = checked_client_id(&args.client_id)?;
    info!(client_id, domain = %session.domain, "revoke-domain-client starting");

    let source: Box<dyn EntitySource<UserSummary>> = if args.use_local_token_stats {
        let stats = load_stat_map(&session.work, &session.domain).await?;
        let users: Vec<UserSummary> =
            users_for_client(&stats, client_id).into_iter().map(UserSummary::from_email).collect();
        info!(users = users.len(), "revoking for users known to hold a token");
        Box::new(KnownUserSource::new(users))
    } else {
        Box::new(DomainUserSource::new(session.api.clone(), session.domain.as_str()))
    };

    let store =
        Arc::new(session.work.scan_store::<RevocationOutcome>(&session.domain, REVOCATION_SCAN));
    let options = session
        .scan_options(format!("{REVOCATION_SCAN}:{client_id}"))
        .with_max_entities((args.first_n > 0).then_some(args.first_n))
        .with_restart(args.restart);
    let revoker = ClientRevoker::new(session.api.clone(), client_id);

    println!("Scanning domain users for {REVOCATION_SCAN}...");
    let run = BatchRunner::new(store, options).run(source.as_ref(), &revoker).await?;

    let revoked = run.state.results.values().filter(|o| **o == RevocationOutcome::Revoked).count();
    println!("{}", report::scan_summary(&run.report));
    println!("{revoked} tokens revoked for {client_id}.");
    info!(client_id, revoked, "revoke-domain-client done");
    print_log_location(session);
    if !args.use_local_token_stats {
        println!("{BLIND_REVOCATION_NOTE}");
    }
    Ok(Outcome::from_report(&run.report))
}

async fn read_blacklist(path: Option<&Path>) -> Result<Vec<String>> {
    match path {
        Some(path) => WorkDir::read_blacklist(path).await,
        None => Ok(Vec::new()),
    }
}

pub async fn revoke_unapproved(session: &Session, args: &RevokeUnapprovedArgs) -> Result<Outcome> {
    if !args.force {
        return Err(DirAdminError::InvalidInput(
            "revoke-unapproved revokes tokens across the domain; pass --force to confirm".into(),
        ));
    }
    if args.client_blacklist.is_none() && args.scope_blacklist.is_none() {
        return Err(DirAdminError::InvalidInput(
            "either --client-blacklist or --scope-blacklist must be supplied".into(),
        ));
    }
    let blacklists = Blacklists::new(
        read_blacklist(args.client_blacklist.as_deref()).await?,
        read_blacklist(args.scope_blacklist.as_deref()).await?,
    )?;
    info!(domain = %session.domain, "revoke-unapproved starting");

    if !args.use_local_token_stats {
        let run = collect_tokens(session, 0, args.restart).await?;
        if !run.report.is_completed() {
            println!("Token stats are incomplete; nothing was revoked. Rerun to resume gathering.");
            return Ok(Outcome::Failed);
        }
    }

    let stats = load_stat_map(&session.work, &session.domain).await?;
    let plan = RevocationPlan::from_stats(&stats, &blacklists);
    println!("{} tokens matched the blacklists.", plan.len());

    let summary = revoke_planned(session.api.as_ref(), &plan).await?;
    println!(
        "{} revoked, {} already gone, {} failed.",
        summary.revoked,
        summary.absent,
        summary.failed.len()
    );
    info!(
        revoked = summary.revoked,
        absent = summary.absent,
        failed = summary.failed.len(),
        "revoke-unapproved done"
    );
    print_log_location(session);

    Ok(if summary.has_failures() { Outcome::PartialFailure } else { Outcome::Success })
}
