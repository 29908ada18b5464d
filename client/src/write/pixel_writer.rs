use std::sync::Arc;

use log::{info, warn};
use tokio::time::timeout;

use pixelplace_shared::{
    constants::COLOR_UNSET, ColorIndex, GlobalPixel, LedgerError, Pubkey, ShardKey,
};

use crate::{
    client_config::ClientConfig,
    error::WriteError,
    replica::{PendingWrite, ReplicaHandle},
    write::{
        ledger_writer::{LedgerWriter, WriteOp, WriteReceipt},
        rollback_guard::RollbackGuard,
    },
};

/// Submits local writes with optimistic replica updates.
///
/// Each write shows its effect at once, then confirms or rolls back when the
/// ledger answers, whether or not the caller is still waiting. A stale delegation gets exactly one re-bind and retry;
/// every other failure is reported once with no retry, so a write is never
/// paid for twice.
#[derive(Clone)]
pub struct PixelWriter {
    replica: ReplicaHandle,
    writer: Arc<dyn LedgerWriter>,
    config: ClientConfig,
}

impl PixelWriter {
    pub fn new(replica: ReplicaHandle, writer: Arc<dyn LedgerWriter>, config: ClientConfig) -> Self {
        Self {
            replica,
            writer,
            config,
        }
    }

    pub async fn place_pixel(
        &self,
        px: u32,
        py: u32,
        color: ColorIndex,
    ) -> Result<WriteReceipt, WriteError> {
        if color == COLOR_UNSET {
            return Err(WriteError::InvalidColor { color });
        }
        let pixel = GlobalPixel::new(px, py)?;
        let op = WriteOp::Place {
            shard: pixel.shard(),
            pixel,
            color,
        };
        self.write_pixel(pixel, color, op).await
    }

    pub async fn erase_pixel(&self, px: u32, py: u32) -> Result<WriteReceipt, WriteError> {
        let pixel = GlobalPixel::new(px, py)?;
        let op = WriteOp::Erase {
            shard: pixel.shard(),
            pixel,
        };
        self.write_pixel(pixel, COLOR_UNSET, op).await
    }

    /// Creates and delegates a shard, showing it unlocked and owned by
    /// `owner` while the write is in flight.
    pub async fn initialize_shard(
        &self,
        shard_x: u32,
        shard_y: u32,
        owner: Pubkey,
    ) -> Result<WriteReceipt, WriteError> {
        let shard = ShardKey::new(shard_x, shard_y)?;
        let write = self
            .replica
            .try_engine()
            .map_err(|_| WriteError::ReplicaPoisoned)?
            .optimistic_unlock(shard, owner);
        let receipt = self.resolve(write, WriteOp::InitializeShard { shard }).await?;
        info!("shard {} initialized in {}", shard, receipt.entry_id);
        Ok(receipt)
    }

    async fn write_pixel(
        &self,
        pixel: GlobalPixel,
        color: ColorIndex,
        op: WriteOp,
    ) -> Result<WriteReceipt, WriteError> {
        let write = self
            .replica
            .try_engine()
            .map_err(|_| WriteError::ReplicaPoisoned)?
            .optimistic_apply(pixel, color);
        self.resolve(write, op).await
    }

    /// Submits `op` and settles `write` on a spawned task. Dropping the
    /// caller's future detaches the write; it still confirms or rolls back
    /// once the ledger answers.
    async fn resolve(&self, write: PendingWrite, op: WriteOp) -> Result<WriteReceipt, WriteError> {
        let guard = RollbackGuard::new(self.replica.clone(), write);
        let writer = self.clone();
        let task = tokio::spawn(async move {
            let receipt = writer.submit(op).await?;
            guard.confirm(receipt.timestamp);
            Ok::<_, WriteError>(receipt)
        });
        task.await.map_err(|err| {
            warn!("write task for {} ended without an answer: {}", op.shard(), err);
            WriteError::TaskAborted
        })?
    }

    /// Runs the op under the write timeout
    async fn submit(&self, op: WriteOp) -> Result<WriteReceipt, WriteError> {
        match timeout(self.config.write_timeout, self.submit_with_rebind(op)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(WriteError::TimedOut {
                after: self.config.write_timeout,
            }),
        }
    }

    async fn submit_with_rebind(&self, op: WriteOp) -> Result<WriteReceipt, LedgerError> {
        match op.submit(self.writer.as_ref()).await {
            Err(LedgerError::StaleDelegation { .. }) => {
                let shard = op.shard();
                warn!("delegation of {} is stale, re-binding before one retry", shard);
                self.writer.rebind_delegation(shard).await?;
                op.submit(self.writer.as_ref()).await
            }
            result => result,
        }
    }
}
