use std::sync::Arc;

use log::{error, info, warn};
use tokio::{sync::watch, time::sleep};

use crate::{
    index::PersistentIndex,
    ingest::{
        backoff::Backoff, blocking::run_blocking, ingest_config::IngestConfig,
        ledger_source::LedgerSource, process::process_entry,
    },
};

/// Follows one source's live stream, re-subscribing with backoff whenever it
/// drops. Live entries never move the cursor: a gap left by a dropped stream
/// must stay visible to backfill.
pub struct LiveFollower {
    source: Arc<dyn LedgerSource>,
    config: IngestConfig,
}

impl LiveFollower {
    pub fn new(source: Arc<dyn LedgerSource>, config: IngestConfig) -> Self {
        Self { source, config }
    }

    pub async fn run(&self, mut index: PersistentIndex, mut shutdown: watch::Receiver<bool>) {
        let label = self.source.label();
        let mut backoff = Backoff::new(
            self.config.reconnect_backoff_min,
            self.config.reconnect_backoff_max,
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.source.subscribe().await {
                Ok(mut notifications) => {
                    info!("{} live subscription open", label);
                    backoff.reset();
                    loop {
                        tokio::select! {
                            changed = shutdown.changed() => {
                                if changed.is_err() || *shutdown.borrow() {
                                    info!("{} live subscription shutting down", label);
                                    return;
                                }
                            }
                            notification = notifications.recv() => {
                                let Some(raw) = notification else {
                                    break;
                                };
                                // A failed write is left for backfill to heal
                                let applied = run_blocking(|| process_entry(&mut index, &raw, false));
                                if let Err(err) = applied {
                                    error!("{} live entry {} not applied: {}", label, raw.entry_id, err);
                                }
                            }
                        }
                    }
                    warn!("{} live subscription dropped, reconnecting", label);
                }
                Err(err) => {
                    warn!("{} live subscribe failed: {}", label, err);
                }
            }

            let delay = backoff.next_delay();
            tokio::select! {
                _ = sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("{} live subscription shutting down", label);
    }
}
