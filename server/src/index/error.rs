use thiserror::Error;

use pixelplace_shared::{PubkeyParseError, ShardPixelsError};

/// Errors that can occur while reading or writing the persistent index
#[derive(Debug, Error)]
pub enum IndexError {
    /// The underlying SQLite call failed (busy, io, constraint, ...)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored shard blob no longer has the 8-bit layout
    #[error("Stored canvas for shard ({shard_x}, {shard_y}) is corrupt: {source}")]
    CorruptCanvas {
        shard_x: u16,
        shard_y: u16,
        source: ShardPixelsError,
    },

    /// A stored key column could not be parsed back
    #[error("Stored key in table {table} is corrupt: {source}")]
    CorruptKey {
        table: &'static str,
        source: PubkeyParseError,
    },

    /// A stored source label is not one of the known ledger tiers
    #[error("Stored source label {label:?} is unknown")]
    UnknownSource { label: String },
}
