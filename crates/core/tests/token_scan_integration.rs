//! End-to-end scans over in-memory ports: collection, resume and revocation

mod support;

use std::sync::Arc;

use diradmin_core::{
    build_stat_map, revoke_planned, users_for_client, BatchRunner, Blacklists, ClientRevoker,
    DomainUserSource, KnownUserSource, RevocationOutcome, RevocationPlan, ScanOptions,
    TokenCollector, TokenStats,
};
use diradmin_domain::{DirAdminError, OAuthToken, ScanStatus, UserSummary};
use support::fakes::{token, MemoryStore, MockDirectory, MockTokens};

const USERS: [&str; 3] = ["u1@example.com", "u2@example.com", "u3@example.com"];
const MAIL: &str = "https://mail.google.com/";
const CONTACTS: &str = "https://www.google.com/m8/feeds";

fn tokens() -> MockTokens {
    MockTokens::default()
        .grant("u1@example.com", token("twitter.com", &[MAIL, CONTACTS]))
        .grant("u2@example.com", token("twitter.com", &[MAIL, CONTACTS]))
        .grant("u2@example.com", token("approved.example.com", &[CONTACTS]))
        .grant("u3@example.com", token("approved.example.com", &[CONTACTS]))
}

fn options() -> ScanOptions {
    ScanOptions::new("collection", "example.com").with_page_size(2).with_checkpoint_every(1)
}

#[tokio::test]
async fn interrupted_collection_resumes_after_last_committed_user() {
    let directory = MockDirectory::with_users(&USERS);
    let source = DomainUserSource::new(Arc::new(directory), "example.com");
    let api = Arc::new(tokens());
    let collector = TokenCollector::new(api.clone());

    // saves: start, u1, u2 <- crash
    let store = Arc::new(MemoryStore::<Vec<OAuthToken>>::crashing_at(3));
    let err = BatchRunner::new(store.clone(), options()).run(&source, &collector).await.unwrap_err();
    assert!(matches!(err, DirAdminError::Storage(_)));

    let persisted = store.snapshot().unwrap();
    assert_eq!(persisted.status, ScanStatus::Running);
    assert_eq!(persisted.cursor.last_committed.as_deref(), Some("u1@example.com"));
    assert_eq!(persisted.results.len(), 1);

    store.recover();
    let run = BatchRunner::new(store.clone(), options()).run(&source, &collector).await.unwrap();

    assert!(run.report.is_completed());
    assert!(run.report.resumed);
    assert_eq!(run.report.succeeded, 2);
    assert_eq!(run.report.skipped, 1);
    assert_eq!(run.state.results.keys().collect::<Vec<_>>(), USERS.iter().collect::<Vec<_>>());
    // u1 is never listed again; u2 was uncommitted when the crash hit
    assert_eq!(
        api.list_calls(),
        vec!["u1@example.com", "u2@example.com", "u2@example.com", "u3@example.com"]
    );
}

#[tokio::test]
async fn uninterrupted_reruns_produce_identical_caches() {
    let source = DomainUserSource::new(Arc::new(MockDirectory::with_users(&USERS)), "example.com");
    let collector = TokenCollector::new(Arc::new(tokens()));
    let store = Arc::new(MemoryStore::<Vec<OAuthToken>>::default());

    let first = BatchRunner::new(store.clone(), options()).run(&source, &collector).await.unwrap();
    let second = BatchRunner::new(store.clone(), options()).run(&source, &collector).await.unwrap();

    assert!(!second.report.resumed);
    assert_eq!(first.state.results, second.state.results);
    assert_eq!(store.snapshot().unwrap().results, first.state.results);
}

#[tokio::test]
async fn one_rejected_user_does_not_affect_the_others() {
    let source = DomainUserSource::new(Arc::new(MockDirectory::with_users(&USERS)), "example.com");
    let api = tokens().fail("u2@example.com", vec![DirAdminError::Rejected("400 invalid user".into())]);
    let collector = TokenCollector::new(Arc::new(api));
    let store = Arc::new(MemoryStore::<Vec<OAuthToken>>::default());

    let run = BatchRunner::new(store, options()).run(&source, &collector).await.unwrap();

    assert!(run.report.is_completed());
    assert!(run.report.has_failures());
    assert_eq!(run.state.results.len(), 2);
    assert_eq!(run.state.results["u3@example.com"].len(), 1);
    assert!(run.state.failures.contains_key("u2@example.com"));
}

#[tokio::test]
async fn gathered_stats_drive_reports_and_blacklist_revocation() {
    let source = DomainUserSource::new(Arc::new(MockDirectory::with_users(&USERS)), "example.com");
    let api = Arc::new(tokens());
    let store = Arc::new(MemoryStore::<Vec<OAuthToken>>::default());
    let run = BatchRunner::new(store, options())
        .run(&source, &TokenCollector::new(api.clone()))
        .await
        .unwrap();

    let stats = build_stat_map(&run.state.results);
    let by_client = TokenStats::by_client(&stats);
    assert_eq!(
        by_client.rankings(),
        vec![("approved.example.com".to_string(), 2), ("twitter.com".to_string(), 2)]
    );
    assert_eq!(TokenStats::by_scope(&stats).top_n(1), vec![(CONTACTS.to_string(), 3)]);

    let lists = Blacklists::new(Vec::<String>::new(), vec![MAIL.to_string()]).unwrap();
    let plan = RevocationPlan::from_stats(&stats, &lists);
    assert_eq!(plan.clients().collect::<Vec<_>>(), vec!["twitter.com"]);

    let summary = revoke_planned(api.as_ref(), &plan).await.unwrap();
    assert_eq!(summary.revoked, 2);
    assert!(api.remaining("u1@example.com").is_empty());
    assert_eq!(api.remaining("u2@example.com").len(), 1);
}

#[tokio::test]
async fn domain_client_revocation_over_known_holders() {
    let source = DomainUserSource::new(Arc::new(MockDirectory::with_users(&USERS)), "example.com");
    let api = Arc::new(tokens());
    let gathered = BatchRunner::new(Arc::new(MemoryStore::<Vec<OAuthToken>>::default()), options())
        .run(&source, &TokenCollector::new(api.clone()))
        .await
        .unwrap();

    let holders = users_for_client(&build_stat_map(&gathered.state.results), "approved.example.com");
    let known = KnownUserSource::new(holders.into_iter().map(UserSummary::from_email).collect());
    let revoker = ClientRevoker::new(api.clone(), "approved.example.com");
    let store = Arc::new(MemoryStore::<RevocationOutcome>::default());

    let run = BatchRunner::new(store, ScanOptions::new("revocation:approved.example.com", "example.com"))
        .run(&known, &revoker)
        .await
        .unwrap();

    assert!(run.report.is_completed());
    assert_eq!(run.state.results.len(), 2);
    assert!(run.state.results.values().all(|o| *o == RevocationOutcome::Revoked));
    assert!(api.remaining("u3@example.com").is_empty());
}
