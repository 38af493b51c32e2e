//! Scan state for resumable batch runs
//!
//! A [`ScanState`] is the single durable artifact of a batch run: the cursor
//! and the result cache live in the same document, so a checkpoint either
//! commits both or neither.
//!
//! On disk (`<work_dir>/<domain>/<name>_scan.json`):
//!
//! ```json
//! {
//!   "version": 1,
//!   "scan": "collection",
//!   "domain": "example.com",
//!   "status": "running",
//!   "started_at": "2026-10-19T08:00:00Z",
//!   "updated_at": "2026-10-19T08:03:12Z",
//!   "cursor": { "page_token": "p2", "last_committed": "bob@example.com", "processed": 112 },
//!   "results": { "alice@example.com": [] },
//!   "failures": { "carol@example.com": "Request rejected: ..." }
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::SCAN_STATE_VERSION;
use crate::impl_status_conversions;

/// Stored lifecycle of a scan. An interrupted run is a `Running` state
/// found at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Running,
    Completed,
}

impl_status_conversions!(ScanStatus {
    Running => "running",
    Completed => "completed",
});

/// Position of the last committed entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCursor {
    /// Token of the page holding the next entity; `None` is the first page.
    pub page_token: Option<String>,
    /// Key of the last committed entity on that page.
    pub last_committed: Option<String>,
    /// Entities committed over the whole logical run.
    pub processed: u64,
}

/// Cursor plus result cache for one logical run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanState<T> {
    pub version: u32,
    pub scan: String,
    pub domain: String,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cursor: ScanCursor,
    pub results: BTreeMap<String, T>,
    #[serde(default)]
    pub failures: BTreeMap<String, String>,
}

impl<T> ScanState<T> {
    pub fn new(scan: impl Into<String>, domain: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: SCAN_STATE_VERSION,
            scan: scan.into(),
            domain: domain.into(),
            status: ScanStatus::Running,
            started_at: now,
            updated_at: now,
            cursor: ScanCursor::default(),
            results: BTreeMap::new(),
            failures: BTreeMap::new(),
        }
    }

    /// Store a result, replacing any earlier result or failure for `key`.
    pub fn record_success(&mut self, key: &str, value: T) {
        self.failures.remove(key);
        self.results.insert(key.to_string(), value);
        self.advance(key);
    }

    /// Record a failure unless `key` already holds a result.
    pub fn record_failure(&mut self, key: &str, reason: impl Into<String>) {
        if !self.results.contains_key(key) {
            self.failures.insert(key.to_string(), reason.into());
        }
        self.advance(key);
    }

    /// Whether `key` already has a committed outcome.
    pub fn is_committed(&self, key: &str) -> bool {
        self.results.contains_key(key) || self.failures.contains_key(key)
    }

    /// Move the cursor to the start of the next page.
    pub fn next_page(&mut self, page_token: Option<String>) {
        self.cursor.page_token = page_token;
        self.cursor.last_committed = None;
    }

    pub fn mark_completed(&mut self) {
        self.status = ScanStatus::Completed;
        self.cursor.page_token = None;
        self.cursor.last_committed = None;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub const fn is_running(&self) -> bool {
        matches!(self.status, ScanStatus::Running)
    }

    fn advance(&mut self, key: &str) {
        self.cursor.last_committed = Some(key.to_string());
        self.cursor.processed += 1;
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Completed,
    Aborted { reason: String },
}

/// Summary of one invocation of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan: String,
    pub outcome: ScanOutcome,
    /// This invocation continued an interrupted run.
    pub resumed: bool,
    pub succeeded: u64,
    pub failed: u64,
    /// Entities passed over because they were already committed.
    pub skipped: u64,
    pub total_results: usize,
    pub total_failures: usize,
}

impl ScanReport {
    pub const fn is_completed(&self) -> bool {
        matches!(self.outcome, ScanOutcome::Completed)
    }

    pub const fn has_failures(&self) -> bool {
        self.total_failures > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_replaces_failure_and_failure_keeps_success() {
        let mut state: ScanState<u32> = ScanState::new("collection", "example.com");

        state.record_failure("a@example.com", "boom");
        assert_eq!(state.failures.len(), 1);

        state.record_success("a@example.com", 3);
        assert!(state.failures.is_empty());
        assert_eq!(state.results["a@example.com"], 3);

        state.record_failure("a@example.com", "boom again");
        assert!(state.failures.is_empty());
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.cursor.processed, 3);
        assert_eq!(state.cursor.last_committed.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn next_page_resets_last_committed() {
        let mut state: ScanState<()> = ScanState::new("collection", "example.com");
        state.record_success("a@example.com", ());
        state.next_page(Some("p2".into()));
        assert_eq!(state.cursor.page_token.as_deref(), Some("p2"));
        assert!(state.cursor.last_committed.is_none());
        assert!(state.is_committed("a@example.com"));
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut state: ScanState<Vec<String>> = ScanState::new("collection", "example.com");
        state.record_success("a@example.com", vec!["client".into()]);
        state.mark_completed();

        let json = serde_json::to_string_pretty(&state).unwrap();
        assert!(json.contains(r#""status": "completed""#));
        let back: ScanState<Vec<String>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn report_outcome_serializes_with_status_tag() {
        let outcome = ScanOutcome::Aborted { reason: "auth".into() };
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"status":"aborted","reason":"auth"}"#);
    }
}
