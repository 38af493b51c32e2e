//! Domain-wide token statistics: `gather-token-stats` and
//! `report-token-stats`

use std::sync::Arc;

use diradmin_core::{
    build_stat_map, BatchRunner, DomainUserSource, ScanRun, ScanStore, StatMap, TokenCollector,
    TokenStats,
};
use diradmin_domain::constants::{COLLECTION_SCAN, TOP_CLIENT_IDS_CSV, TOP_SCOPES_CSV};
use diradmin_domain::{DirAdminError, OAuthToken, Result, ScanStatus, UserSummary};
use diradmin_infra::WorkDir;
use tracing::{info, warn};

use super::{print_lines, Outcome};
use crate::cli::{GatherTokenStatsArgs, ReportTokenStatsArgs};
use crate::report::{self, ReportOptions};
use crate::session::Session;

/// Run (or resume) the collection scan: every user's tokens into the
/// result cache.
pub(crate) async fn collect_tokens(
    session: &Session,
    first_n: u64,
    restart: bool,
) -> Result<ScanRun<Vec<OAuthToken>>> {
    let store =
        Arc::new(session.work.scan_store::<Vec<OAuthToken>>(&session.domain, COLLECTION_SCAN));
    let options = session
        .scan_options(COLLECTION_SCAN)
        .with_max_entities((first_n > 0).then_some(first_n))
        .with_restart(restart);

    println!("Scanning domain users for {COLLECTION_SCAN}...");
    let source = DomainUserSource::new(session.api.clone(), session.domain.as_str());
    let collector = TokenCollector::new(session.api.clone());
    let run = BatchRunner::new(store, options).run::<UserSummary>(&source, &collector).await?;

    println!("{}", report::scan_summary(&run.report));
    Ok(run)
}

pub async fn gather_token_stats(session: &Session, args: &GatherTokenStatsArgs) -> Result<Outcome> {
    let run = collect_tokens(session, args.first_n, args.restart).await?;
    if run.report.is_completed() {
        println!(
            "Token stats written: {}",
            session.work.scan_path(&session.domain, COLLECTION_SCAN).display()
        );
    } else {
        println!("Rerun gather-token-stats to resume after the last committed user.");
    }
    Ok(Outcome::from_report(&run.report))
}

/// Stat map from the stored collection scan.
///
/// # Errors
/// Returns `NotFound` when no tokens were gathered for `domain` yet.
pub(crate) async fn load_stat_map(work: &WorkDir, domain: &str) -> Result<StatMap> {
    let store = work.scan_store::<Vec<OAuthToken>>(domain, COLLECTION_SCAN);
    let Some(state) = store.load().await? else {
        return Err(DirAdminError::NotFound(format!(
            "no token stats for {domain}; run gather-token-stats first"
        )));
    };
    if state.status == ScanStatus::Running {
        warn!(
            processed = state.cursor.processed,
            "token stats come from an unfinished scan; rerun gather-token-stats to complete them"
        );
    }
    info!(users = state.results.len(), status = %state.status, "token stats loaded");
    Ok(build_stat_map(&state.results))
}

pub async fn report_token_stats(
    work: &WorkDir,
    domain: &str,
    args: &ReportTokenStatsArgs,
) -> Result<Outcome> {
    if args.csv {
        WorkDir::check_overwrite(&work.report_path(domain, TOP_CLIENT_IDS_CSV), args.force)?;
        WorkDir::check_overwrite(&work.report_path(domain, TOP_SCOPES_CSV), args.force)?;
    }

    let stats = load_stat_map(work, domain).await?;
    let by_client = TokenStats::by_client(&stats);
    let by_scope = TokenStats::by_scope(&stats);

    let options =
        ReportOptions { top_n: args.top_n, long: args.long_list(), show_users: args.show_users };
    print_lines(report::client_report(&by_client, options));
    print_lines(report::scope_report(&by_scope, options));

    if args.csv {
        let path = work.report_path(domain, TOP_CLIENT_IDS_CSV);
        let rows = report::ranking_rows(&by_client, args.top_n);
        WorkDir::write_csv(&path, &["NUM_USERS", "CLIENT_ID"], rows, args.force).await?;
        println!("Wrote common client ids report: {}.", path.display());

        let path = work.report_path(domain, TOP_SCOPES_CSV);
        let rows = report::ranking_rows(&by_scope, args.top_n);
        WorkDir::write_csv(&path, &["NUM_USERS", "SCOPE"], rows, args.force).await?;
        println!("Wrote common scopes report: {}.", path.display());
    }
    Ok(Outcome::Success)
}
