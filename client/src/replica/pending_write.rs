use pixelplace_shared::{GlobalPixel, Pubkey, ShardKey};

use crate::replica::shard_record::ShardRecord;

/// Token of one optimistic write. Resolving a token that is no longer
/// pending (superseded, or cleared by a reset) does nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PendingWrite(u64);

impl PendingWrite {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What a pending write needs to undo itself
pub(crate) enum PendingEffect {
    Pixel {
        pixel: GlobalPixel,
    },
    Unlock {
        shard: ShardKey,
        prior_record: Option<ShardRecord>,
        /// Owner from a remote init that arrived while this unlock was pending
        suppressed_owner: Option<Pubkey>,
    },
}
