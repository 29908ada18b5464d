use std::{path::PathBuf, sync::Arc};

use log::info;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    index::PersistentIndex,
    ingest::{
        backfill::Backfiller, error::IngestError, ingest_config::IngestConfig,
        ledger_source::LedgerSource, live::LiveFollower,
    },
};

/// Feeds every configured ledger source into one index file.
///
/// Each source gets a live task and a periodic backfill task, each with its
/// own connection. They coordinate only through the processed-entry log.
pub struct Ingestor {
    database_path: PathBuf,
    config: IngestConfig,
    sources: Vec<Arc<dyn LedgerSource>>,
}

impl Ingestor {
    pub fn new(database_path: impl Into<PathBuf>, config: IngestConfig) -> Self {
        Self {
            database_path: database_path.into(),
            config,
            sources: Vec::new(),
        }
    }

    pub fn add_source(&mut self, source: Arc<dyn LedgerSource>) {
        self.sources.push(source);
    }

    /// Runs until `shutdown` turns true (or its sender is dropped), then waits
    /// for every task to stop.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<(), IngestError> {
        let mut tasks: Vec<(JoinHandle<()>, _)> = Vec::new();

        for source in &self.sources {
            let label = source.label();

            let live = LiveFollower::new(Arc::clone(source), self.config.clone());
            let live_index = PersistentIndex::open(&self.database_path)?;
            let live_shutdown = shutdown.clone();
            tasks.push((
                tokio::spawn(async move { live.run(live_index, live_shutdown).await }),
                label,
            ));

            let backfill = Backfiller::new(Arc::clone(source), self.config.clone());
            let backfill_index = PersistentIndex::open(&self.database_path)?;
            let backfill_shutdown = shutdown.clone();
            tasks.push((
                tokio::spawn(async move { backfill.run(backfill_index, backfill_shutdown).await }),
                label,
            ));
        }
        info!("ingest started for {} sources", self.sources.len());

        let mut result = Ok(());
        for (task, source_label) in tasks {
            if task.await.is_err() && result.is_ok() {
                result = Err(IngestError::TaskAborted { source_label });
            }
        }
        info!("ingest stopped");
        result
    }
}
