use thiserror::Error;

use crate::geometry::error::CoordinateError;

/// Failures reported by the external ledger, for reads and writes alike.
///
/// The variants are the retry taxonomy: transient failures are retried with
/// backoff, a stale delegation allows exactly one re-bind and retry, and
/// everything else is surfaced to the caller once.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Connection dropped, request timed out, or the node rate-limited us
    #[error("Transient network failure: {message}")]
    TransientNetwork { message: String },

    /// The shard's fast-path binding expired; re-bind then retry once
    #[error("Delegation of shard ({shard_x}, {shard_y}) is stale")]
    StaleDelegation { shard_x: u16, shard_y: u16 },

    /// The payer cannot cover the write; never retried automatically
    #[error("Insufficient funds to submit the write")]
    InsufficientFunds,

    /// Rejected locally before any network call
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),

    /// The ledger program rejected the write for any other reason
    #[error("Ledger rejected the request: {message}")]
    Rejected { message: String },
}

impl LedgerError {
    pub fn transient(message: impl Into<String>) -> Self {
        LedgerError::TransientNetwork {
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::TransientNetwork { .. })
    }

    pub fn is_stale_delegation(&self) -> bool {
        matches!(self, LedgerError::StaleDelegation { .. })
    }
}
