use std::sync::Arc;

use log::{info, warn};
use tokio::{sync::watch, time::sleep};

use pixelplace_shared::{EntryId, RawLogBatch};

use crate::{
    index::{ApplyOutcome, PersistentIndex, SyncCursor},
    ingest::{
        blocking::run_blocking,
        error::IngestError,
        ingest_config::IngestConfig,
        ledger_source::LedgerSource,
        process::{process_entry, EntryOutcome},
    },
};

/// Summary of one backfill pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub pages_fetched: usize,
    pub entries_seen: usize,
    pub applied: usize,
    pub skipped_duplicate: usize,
    pub skipped_malformed: usize,
    /// A page fetch failed or shutdown was requested before history reached
    /// the cursor; the cursor was left where it was
    pub stopped_early: bool,
}

/// Pages one source's history back to its cursor and applies what is missing.
pub struct Backfiller {
    source: Arc<dyn LedgerSource>,
    config: IngestConfig,
}

impl Backfiller {
    pub fn new(source: Arc<dyn LedgerSource>, config: IngestConfig) -> Self {
        Self { source, config }
    }

    /// Runs one pass. Pages are fetched newest to oldest down to the stored
    /// cursor and each page is applied as it arrives, oldest entry first.
    /// Only a pass that reaches the cursor, or the start of history, moves
    /// the cursor, and then straight to the newest entry it saw. A crash or
    /// a failed fetch part way leaves the cursor put; the next pass fetches
    /// the same range again and skips what is already processed.
    pub async fn run_pass(
        &self,
        index: &mut PersistentIndex,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<BackfillReport, IngestError> {
        let label = self.source.label();
        let stop_at = run_blocking(|| index.cursor(label))?.map(|cursor| cursor.entry_id);
        let mut report = BackfillReport::default();
        let mut newest: Option<SyncCursor> = None;
        let mut before: Option<EntryId> = None;

        loop {
            let page = match self
                .source
                .fetch_history(before.as_ref(), stop_at.as_ref(), self.config.page_size)
                .await
            {
                Ok(page) => page,
                Err(error) => {
                    warn!("{} backfill stopped, history fetch failed: {}", label, error);
                    report.stopped_early = true;
                    break;
                }
            };
            report.pages_fetched += 1;

            let page_len = page.len();
            let fresh: Vec<RawLogBatch> = page
                .into_iter()
                .take_while(|entry| stop_at.as_ref() != Some(&entry.entry_id))
                .collect();
            let reached_cursor = fresh.len() < page_len;

            if newest.is_none() {
                newest = fresh
                    .first()
                    .map(|entry| SyncCursor::new(entry.entry_id.clone(), entry.slot));
            }
            before = fresh.last().map(|entry| entry.entry_id.clone());
            run_blocking(|| apply_page(index, &fresh, &mut report))?;

            if reached_cursor || page_len < self.config.page_size || before.is_none() {
                break;
            }
            if *shutdown.borrow() {
                report.stopped_early = true;
                break;
            }
            sleep(self.config.page_delay).await;
        }

        if !report.stopped_early {
            if let Some(cursor) = &newest {
                run_blocking(|| index.advance_cursor(label, cursor))?;
            }
        }

        info!(
            "{} backfill: {} pages, {} entries, {} applied, {} duplicate, {} malformed{}",
            label,
            report.pages_fetched,
            report.entries_seen,
            report.applied,
            report.skipped_duplicate,
            report.skipped_malformed,
            if report.stopped_early { ", stopped early" } else { "" }
        );
        Ok(report)
    }

    /// Runs a pass every `backfill_interval` until shutdown. A failed pass is
    /// logged and retried on the next tick.
    pub async fn run(&self, mut index: PersistentIndex, mut shutdown: watch::Receiver<bool>) {
        let label = self.source.label();
        loop {
            if let Err(error) = self.run_pass(&mut index, &shutdown).await {
                warn!("{} backfill pass failed: {}", label, error);
            }
            tokio::select! {
                _ = sleep(self.config.backfill_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("{} backfill shutting down", label);
                        return;
                    }
                }
            }
        }
    }
}

/// Applies one page of history, oldest entry first, without touching the cursor
fn apply_page(
    index: &mut PersistentIndex,
    page: &[RawLogBatch],
    report: &mut BackfillReport,
) -> Result<(), IngestError> {
    for entry in page.iter().rev() {
        report.entries_seen += 1;
        if index.is_processed(&entry.entry_id)? {
            report.skipped_duplicate += 1;
            continue;
        }
        match process_entry(index, entry, false)? {
            EntryOutcome::Applied(ApplyOutcome::AlreadyProcessed) => {
                report.skipped_duplicate += 1
            }
            EntryOutcome::Applied(_) => report.applied += 1,
            EntryOutcome::Malformed(_) => report.skipped_malformed += 1,
        }
    }
    Ok(())
}
