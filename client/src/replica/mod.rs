mod pending_write;
mod pixel_state;
mod recent_feed;
mod replica_handle;
mod shard_record;
mod sync_engine;

pub use pending_write::PendingWrite;
pub use pixel_state::PixelState;
pub use recent_feed::RecentFeed;
pub use replica_handle::ReplicaHandle;
pub use shard_record::ShardRecord;
pub use sync_engine::{ReplicaSyncEngine, SnapshotPixel};
