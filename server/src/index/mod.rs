mod apply;
pub mod error;
mod persistent_index;
mod queries;
mod schema;
mod sync_cursor;

pub use apply::{ApplyOutcome, AppliedCounts, EntryBatch};
pub use error::IndexError;
pub use persistent_index::PersistentIndex;
pub use queries::{PixelHistoryRow, ShardRecord};
pub use sync_cursor::SyncCursor;
