use async_trait::async_trait;

use pixelplace_shared::{ColorIndex, EntryId, GlobalPixel, LedgerError, ShardKey, Timestamp};

/// Result of a write the ledger accepted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteReceipt {
    pub entry_id: EntryId,
    pub timestamp: Timestamp,
}

/// The ledger's write surface. Calls are opaque remote operations.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    async fn place_pixel(
        &self,
        shard: ShardKey,
        pixel: GlobalPixel,
        color: ColorIndex,
    ) -> Result<WriteReceipt, LedgerError>;

    async fn erase_pixel(&self, shard: ShardKey, pixel: GlobalPixel)
        -> Result<WriteReceipt, LedgerError>;

    /// Creates the shard account and binds it to the ephemeral overlay
    async fn initialize_shard(&self, shard: ShardKey) -> Result<WriteReceipt, LedgerError>;

    /// Re-binds an expired delegation so the shard accepts fast writes again
    async fn rebind_delegation(&self, shard: ShardKey) -> Result<(), LedgerError>;
}

/// One write, kept so it can be submitted again after a re-bind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOp {
    Place {
        shard: ShardKey,
        pixel: GlobalPixel,
        color: ColorIndex,
    },
    Erase {
        shard: ShardKey,
        pixel: GlobalPixel,
    },
    InitializeShard {
        shard: ShardKey,
    },
}

impl WriteOp {
    pub fn shard(&self) -> ShardKey {
        match self {
            WriteOp::Place { shard, .. }
            | WriteOp::Erase { shard, .. }
            | WriteOp::InitializeShard { shard } => *shard,
        }
    }

    pub(crate) async fn submit(
        &self,
        writer: &dyn LedgerWriter,
    ) -> Result<WriteReceipt, LedgerError> {
        match *self {
            WriteOp::Place {
                shard,
                pixel,
                color,
            } => writer.place_pixel(shard, pixel, color).await,
            WriteOp::Erase { shard, pixel } => writer.erase_pixel(shard, pixel).await,
            WriteOp::InitializeShard { shard } => writer.initialize_shard(shard).await,
        }
    }
}
