use std::time::Duration;

use thiserror::Error;

use pixelplace_shared::{ColorIndex, CoordinateError, LedgerError, ShardPixelsError};

/// Errors that can occur while loading state into the replica
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplicaError {
    #[error("Snapshot of shard ({shard_x}, {shard_y}) is invalid: {source}")]
    InvalidShardBlob {
        shard_x: u16,
        shard_y: u16,
        source: ShardPixelsError,
    },

    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),

    #[error("Delegation check of shard ({shard_x}, {shard_y}) failed: {error}")]
    DelegationCheck {
        shard_x: u16,
        shard_y: u16,
        error: LedgerError,
    },

    /// A thread panicked while holding the replica lock
    #[error("Replica state is poisoned")]
    Poisoned,
}

/// Errors surfaced by a write. The optimistic state has already been rolled
/// back by the time the caller sees one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriteError {
    /// Rejected before any network call
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),

    /// Painting needs a palette color; use an erase to clear a pixel
    #[error("Color {color} cannot be painted, palette colors are 1-255")]
    InvalidColor { color: ColorIndex },

    /// The ledger failed the write, after the one re-bind retry if it applied
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Write did not resolve within {after:?}")]
    TimedOut { after: Duration },

    /// A thread panicked while holding the replica lock
    #[error("Replica state is poisoned")]
    ReplicaPoisoned,

    /// The background write task panicked or its runtime shut down
    #[error("Write task panicked or was cancelled")]
    TaskAborted,
}
