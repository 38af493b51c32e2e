//! Batch runner: paginated iteration with checkpointed progress
//!
//! Lifecycle of a scan: `NotStarted -> Running -> {Completed, Aborted}`.
//! A process that dies mid-run leaves a `Running` state behind; the next
//! start finds it and resumes (the run was `Interrupted`).
//!
//! Commit points: every `checkpoint_every` entities (default 1, so each
//! processed entity is durable before the next one starts), at each page
//! boundary, on abort and on completion. Each commit writes cursor and
//! results in one atomic store operation. A larger `checkpoint_every`
//! trades fewer writes for up to `checkpoint_every - 1` entities being
//! processed again after a crash.

use std::sync::Arc;

use diradmin_domain::constants::{DEFAULT_CHECKPOINT_EVERY, DEFAULT_PAGE_SIZE};
use diradmin_domain::{
    DirAdminError, ErrorClass, Result, ScanOutcome, ScanReport, ScanState,
};
use tracing::{debug, error, info, instrument, warn};

use super::ports::{EntityProcessor, EntitySource, ScanEntity, ScanStore};

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Identity of the logical run, stored in the state and checked on resume
    pub scan: String,
    pub domain: String,
    pub page_size: u32,
    pub checkpoint_every: u32,
    /// Stop after this many committed entities
    pub max_entities: Option<u64>,
    /// Discard an interrupted run instead of resuming it
    pub restart: bool,
}

impl ScanOptions {
    pub fn new(scan: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            scan: scan.into(),
            domain: domain.into(),
            page_size: DEFAULT_PAGE_SIZE,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            max_entities: None,
            restart: false,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_checkpoint_every(mut self, every: u32) -> Self {
        self.checkpoint_every = every.max(1);
        self
    }

    /// `Some(0)` means no limit.
    pub fn with_max_entities(mut self, max: Option<u64>) -> Self {
        self.max_entities = max.filter(|n| *n > 0);
        self
    }

    pub fn with_restart(mut self, restart: bool) -> Self {
        self.restart = restart;
        self
    }
}

/// Report plus the final state (results included) of a run.
#[derive(Debug, Clone)]
pub struct ScanRun<T> {
    pub report: ScanReport,
    pub state: ScanState<T>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    succeeded: u64,
    failed: u64,
    skipped: u64,
}

/// Drives a resumable scan over an [`EntitySource`].
pub struct BatchRunner<T> {
    store: Arc<dyn ScanStore<T>>,
    options: ScanOptions,
}

impl<T> BatchRunner<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(store: Arc<dyn ScanStore<T>>, options: ScanOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Run (or resume) the scan to completion or abort.
    ///
    /// Entity-level failures are recorded and skipped over. A scan-fatal
    /// error or a listing failure ends the run with
    /// [`ScanOutcome::Aborted`], leaving the cursor at the last committed
    /// entity. Only store failures are returned as `Err`.
    #[instrument(skip_all, fields(scan = %self.options.scan, domain = %self.options.domain))]
    pub async fn run<E: ScanEntity>(
        &self,
        source: &dyn EntitySource<E>,
        processor: &dyn EntityProcessor<E, T>,
    ) -> Result<ScanRun<T>> {
        let (mut state, resumed) = self.start().await?;
        let checkpoint_every = self.options.checkpoint_every.max(1);
        let mut tally = Tally::default();
        let mut pending: u32 = 0;
        let mut relisted = false;

        loop {
            let page_token = state.cursor.page_token.clone();
            let page = match source.fetch_page(page_token.as_deref(), self.options.page_size).await
            {
                Ok(page) => page,
                Err(err @ DirAdminError::Rejected(_))
                    if resumed && !relisted && page_token.is_some() =>
                {
                    warn!(error = %err, "stored page token rejected, relisting from the first page");
                    relisted = true;
                    state.next_page(None);
                    continue;
                }
                Err(err) => {
                    error!(error = %err, "listing failed, aborting scan");
                    let reason = format!("listing failed: {err}");
                    return self.abort(state, tally, resumed, reason).await;
                }
            };

            debug!(
                entities = page.entities.len(),
                has_next = page.next_page_token.is_some(),
                "fetched page"
            );

            let mut limit_hit = false;
            for entity in &page.entities {
                if self.limit_reached(&state) {
                    limit_hit = true;
                    break;
                }

                let key = entity.key();
                if state.is_committed(key) {
                    tally.skipped += 1;
                    continue;
                }

                match processor.process(entity).await {
                    Ok(value) => {
                        state.record_success(key, value);
                        tally.succeeded += 1;
                    }
                    Err(err) if err.class() == ErrorClass::ScanFatal => {
                        error!(entity = key, error = %err, "fatal error, aborting scan");
                        let reason = format!("{key}: {err}");
                        return self.abort(state, tally, resumed, reason).await;
                    }
                    Err(err) => {
                        warn!(entity = key, error = %err, class = %err.class(), "entity failed, continuing");
                        state.record_failure(key, err.to_string());
                        tally.failed += 1;
                    }
                }

                pending += 1;
                if pending >= checkpoint_every {
                    self.commit(&mut state).await?;
                    pending = 0;
                }
            }

            let next_page_token = page.next_page_token;
            if limit_hit || next_page_token.is_none() || self.limit_reached(&state) {
                state.mark_completed();
                self.commit(&mut state).await?;
                break;
            }

            state.next_page(next_page_token);
            self.commit(&mut state).await?;
            pending = 0;
        }

        info!(
            succeeded = tally.succeeded,
            failed = tally.failed,
            skipped = tally.skipped,
            results = state.results.len(),
            failures = state.failures.len(),
            "scan completed"
        );
        let report = self.report(&state, ScanOutcome::Completed, resumed, tally);
        Ok(ScanRun { report, state })
    }

    async fn start(&self) -> Result<(ScanState<T>, bool)> {
        match self.store.load().await? {
            Some(state) if state.is_running() && !self.options.restart => {
                if state.scan != self.options.scan || state.domain != self.options.domain {
                    return Err(DirAdminError::InvalidInput(format!(
                        "an interrupted '{}' scan for {} is pending; finish it or pass --restart",
                        state.scan, state.domain
                    )));
                }
                info!(
                    processed = state.cursor.processed,
                    last_committed = ?state.cursor.last_committed,
                    "resuming interrupted scan"
                );
                return Ok((state, true));
            }
            Some(state) if state.is_running() => {
                info!(processed = state.cursor.processed, "discarding interrupted scan state");
                self.store.discard().await?;
            }
            Some(_) | None => {}
        }

        let mut state = ScanState::new(self.options.scan.clone(), self.options.domain.clone());
        self.commit(&mut state).await?;
        info!("starting new scan");
        Ok((state, false))
    }

    async fn abort(
        &self,
        mut state: ScanState<T>,
        tally: Tally,
        resumed: bool,
        reason: String,
    ) -> Result<ScanRun<T>> {
        self.commit(&mut state).await?;
        warn!(
            processed = state.cursor.processed,
            last_committed = ?state.cursor.last_committed,
            reason = %reason,
            "scan aborted; rerun to resume"
        );
        let report = self.report(&state, ScanOutcome::Aborted { reason }, resumed, tally);
        Ok(ScanRun { report, state })
    }

    async fn commit(&self, state: &mut ScanState<T>) -> Result<()> {
        state.touch();
        self.store.save(state).await?;
        debug!(
            processed = state.cursor.processed,
            last_committed = ?state.cursor.last_committed,
            "checkpoint committed"
        );
        Ok(())
    }

    fn limit_reached(&self, state: &ScanState<T>) -> bool {
        self.options.max_entities.is_some_and(|max| state.cursor.processed >= max)
    }

    fn report(
        &self,
        state: &ScanState<T>,
        outcome: ScanOutcome,
        resumed: bool,
        tally: Tally,
    ) -> ScanReport {
        ScanReport {
            scan: state.scan.clone(),
            outcome,
            resumed,
            succeeded: tally.succeeded,
            failed: tally.failed,
            skipped: tally.skipped,
            total_results: state.results.len(),
            total_failures: state.failures.len(),
        }
    }
}
