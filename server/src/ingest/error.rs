use thiserror::Error;

use pixelplace_shared::SourceLabel;

use crate::index::IndexError;

/// Errors that stop an ingest task or a backfill pass
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("Ingest task for {source_label} panicked or was cancelled")]
    TaskAborted { source_label: SourceLabel },
}
