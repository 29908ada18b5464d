use pixelplace_shared::{EntryId, Slot};

/// Where a source's backfill last committed. Backfill stops paging once it
/// reaches this entry; everything at or before it has been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncCursor {
    pub entry_id: EntryId,
    pub slot: Slot,
}

impl SyncCursor {
    pub fn new(entry_id: EntryId, slot: Slot) -> Self {
        Self { entry_id, slot }
    }
}
