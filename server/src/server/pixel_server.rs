use std::sync::Arc;

use axum::Router;
use log::info;
use tokio::{net::TcpListener, sync::watch};

use crate::{
    api::{router, ApiState},
    error::PixelServerError,
    index::PersistentIndex,
    ingest::{Ingestor, LedgerSource},
    server::ServerConfig,
};

/// The indexer process: ingest tasks for every source plus the read api,
/// all over one index file.
pub struct PixelServer {
    config: ServerConfig,
    sources: Vec<Arc<dyn LedgerSource>>,
}

impl PixelServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            sources: Vec::new(),
        }
    }

    /// Registers a ledger tier to ingest from
    pub fn add_source(&mut self, source: Arc<dyn LedgerSource>) {
        self.sources.push(source);
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The read api router over its own index handle
    pub fn router(&self) -> Result<Router, PixelServerError> {
        let index = PersistentIndex::open(&self.config.database_path)?;
        index.log_summary()?;
        Ok(router(ApiState::new(
            index,
            self.config.feed_limit,
            self.config.program_id,
        )))
    }

    /// Serves the read api on `listener` and runs ingest until `shutdown`
    /// turns true.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), PixelServerError> {
        let app = self.router()?;
        info!(
            "read api listening on {}, indexing program {}",
            listener.local_addr()?,
            self.config.program_id
        );

        let mut ingestor = Ingestor::new(&self.config.database_path, self.config.ingest.clone());
        for source in self.sources {
            ingestor.add_source(source);
        }
        let ingest = tokio::spawn(ingestor.run(shutdown.clone()));

        let mut api_shutdown = shutdown;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                while !*api_shutdown.borrow() {
                    if api_shutdown.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await?;

        ingest.await.map_err(|_| PixelServerError::IngestAborted)??;
        Ok(())
    }
}
