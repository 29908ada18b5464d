use async_trait::async_trait;
use tokio::sync::mpsc;

use pixelplace_shared::{EntryId, LedgerError, RawLogBatch, SourceLabel};

/// Read side of one ledger tier.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    fn label(&self) -> SourceLabel;

    /// Opens a live stream of the canvas program's log notifications. The
    /// channel closing means the subscription dropped.
    async fn subscribe(&self) -> Result<mpsc::Receiver<RawLogBatch>, LedgerError>;

    /// One page of history, newest first. `before` excludes that entry and
    /// everything newer; `until` stops the page at (and excluding) that entry.
    async fn fetch_history(
        &self,
        before: Option<&EntryId>,
        until: Option<&EntryId>,
        limit: usize,
    ) -> Result<Vec<RawLogBatch>, LedgerError>;
}
