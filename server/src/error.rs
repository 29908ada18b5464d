use thiserror::Error;

use crate::{index::IndexError, ingest::IngestError};

#[derive(Debug, Error)]
pub enum PixelServerError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Read api failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ingest task panicked or was cancelled")]
    IngestAborted,
}
