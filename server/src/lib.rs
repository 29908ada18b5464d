//! # Pixelplace Server
//! Indexes the shared canvas from both ledger tiers into SQLite and serves
//! the feed, global stats and per-user stats over HTTP.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

mod api;
mod error;
mod index;
mod ingest;
mod server;

pub use api::{router, ApiError, ApiErrorBody, ApiResult, ApiState, ShardAccountResponse};
pub use error::PixelServerError;
pub use index::{
    ApplyOutcome, AppliedCounts, EntryBatch, IndexError, PersistentIndex, PixelHistoryRow,
    ShardRecord, SyncCursor,
};
pub use ingest::{
    process_entry, BackfillReport, Backfiller, EntryOutcome, IngestConfig, IngestError, Ingestor,
    LedgerSource, LiveFollower,
};
pub use server::{PixelServer, ServerConfig};
