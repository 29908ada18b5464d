//! # Pixelplace Client
//! A local replica of the shared canvas. Merges snapshot pages and live
//! ledger events, shows local writes optimistically and rolls them back when
//! they fail, and tracks which shards are delegated to the fast overlay.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

mod client_config;
mod delegation;
mod error;
mod replica;
mod write;

pub use client_config::ClientConfig;
pub use delegation::{
    check_delegation, AccountOwnerSource, CheckTicket, DelegationChecker, DelegationStatusCache,
    OwnerDelegationChecker, ShardLockState,
};
pub use error::{ReplicaError, WriteError};
pub use replica::{
    PendingWrite, PixelState, RecentFeed, ReplicaHandle, ReplicaSyncEngine, ShardRecord,
    SnapshotPixel,
};
pub use write::{LedgerWriter, PixelWriter, WriteOp, WriteReceipt};
